//! Registration, login and profile-edit handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use blogicum_core::domain::User;
use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_shared::dto::{
    AccountResponse, AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_USERNAME_LEN: usize = 150;

fn validate_username(username: &str, errors: &mut Vec<String>) {
    if username.is_empty() {
        errors.push("username must not be empty".to_string());
    } else if username.len() > MAX_USERNAME_LEN {
        errors.push(format!("username exceeds {MAX_USERNAME_LEN} characters"));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push("username may only contain letters, digits and @.+-_".to_string());
    }
}

fn validate_email(email: &str, errors: &mut Vec<String>) {
    if email.is_empty() || !email.contains('@') {
        errors.push("invalid email address".to_string());
    }
}

fn account_response(user: &User) -> AccountResponse {
    AccountResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at,
    }
}

fn issue_token(token_service: &Arc<dyn TokenService>, user: &User) -> AppResult<AuthResponse> {
    let token = token_service
        .generate_token(user.id, &user.username, user.is_staff)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    })
}

/// POST /api/auth/register
///
/// Registration logs the new user straight in: the response carries a token.
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut errors = Vec::new();
    validate_username(&req.username, &mut errors);
    validate_email(&req.email, &mut errors);
    if req.password.len() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(req.username, req.email, password_hash);
    let saved = state.users.insert(user).await?;

    tracing::info!(username = %saved.username, "User registered");

    Ok(HttpResponse::Created().json(issue_token(&token_service, &saved)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(issue_token(&token_service, &user)?))
}

/// GET /api/auth/me - the authenticated account
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(account_response(&user)))
}

/// PUT /api/auth/profile - edit the authenticated account
///
/// Always operates on the requester's own account; there is no editing of
/// other users here, so no authorship check is needed.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))?;

    let mut errors = Vec::new();
    if let Some(username) = req.username {
        validate_username(&username, &mut errors);
        if errors.is_empty() && username != user.username {
            if state.users.find_by_username(&username).await?.is_some() {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            user.username = username;
        }
    }
    if let Some(email) = req.email {
        validate_email(&email, &mut errors);
        if errors.is_empty() && email != user.email {
            if state.users.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            user.email = email;
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }

    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(account_response(&saved)))
}
