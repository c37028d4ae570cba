//! Public profile handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::visibility::FeedScope;
use blogicum_shared::dto::ProfileResponse;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::PageQuery;
use super::posts::paginated_posts;

/// GET /api/profile/{username}
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{username}' not found")))?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    }))
}

/// GET /api/profile/{username}/posts - the per-author feed
///
/// Readers get the publicly visible posts; the profile owner (and staff)
/// also see unpublished and scheduled ones.
pub async fn profile_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{username}' not found")))?;

    let page = query.page();
    let is_owner = viewer
        .0
        .as_ref()
        .is_some_and(|v| v.user_id == user.id || v.is_staff);

    let page_of = if is_owner {
        state.posts.author_page(user.id, page).await?
    } else {
        state
            .posts
            .visible_page(FeedScope::Author(user.id), Utc::now(), page)
            .await?
    };

    Ok(HttpResponse::Ok().json(paginated_posts(&state, page_of, page).await?))
}
