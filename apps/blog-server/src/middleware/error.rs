//! Error handling - RFC 7807 compliant responses.
//!
//! One variant is deliberately not an RFC 7807 document: a failed
//! authorship check answers `303 See Other` pointing at the record's parent
//! post, the same way list and detail views treat a non-author - they show
//! the post, they don't scold the reader.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use blogicum_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal(String),
    Validation(Vec<String>),
    /// Authorship denial: redirect to the given detail URL.
    SeeOther(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::SeeOther(url) => write!(f, "See other: {}", url),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SeeOther(_) => StatusCode::SEE_OTHER,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail.clone()),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail.clone()),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Conflict(detail) => {
                ErrorResponse::new(409, "Conflict").with_detail(detail.clone())
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::Validation(errors) => {
                ErrorResponse::new(422, "Validation Failed").with_detail(errors.join(", "))
            }
            AppError::SeeOther(url) => {
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, url.clone()))
                    .finish();
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<blogicum_core::error::RepoError> for AppError {
    fn from(err: blogicum_core::error::RepoError) -> Self {
        match err {
            blogicum_core::error::RepoError::NotFound => {
                AppError::NotFound("Resource not found".to_string())
            }
            blogicum_core::error::RepoError::Constraint(msg) => AppError::Conflict(msg),
            blogicum_core::error::RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            blogicum_core::error::RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<blogicum_core::ports::AuthError> for AppError {
    fn from(err: blogicum_core::ports::AuthError) -> Self {
        match err {
            blogicum_core::ports::AuthError::InvalidCredentials => AppError::Unauthorized,
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
