//! Comment handlers, nested under their post.
//!
//! Every route first resolves the parent post; a comment reached through
//! the wrong post's URL is treated as missing. Denied edits and deletes
//! redirect to the parent post's detail URL, like posts do.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::authz::can_modify;
use blogicum_core::domain::Comment;
use blogicum_shared::dto::{CommentRequest, CommentResponse, ProfileResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::posts::{detail_url, find_post, visible_to};

pub(crate) async fn comment_response(
    state: &AppState,
    comment: &Comment,
) -> AppResult<CommentResponse> {
    let author = state
        .users
        .find_by_id(comment.author_id)
        .await?
        .ok_or_else(|| AppError::Internal("Comment author missing".to_string()))?;

    Ok(CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author: ProfileResponse {
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
        },
        text: comment.text.clone(),
        created_at: comment.created_at,
    })
}

fn validate_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "text must not be empty".to_string(),
        ]));
    }
    Ok(())
}

/// Fetch a comment under the given post, or answer 404.
async fn find_comment(state: &AppState, post_id: Uuid, comment_id: Uuid) -> AppResult<Comment> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;
    Ok(comment)
}

/// GET /api/posts/{post_id}/comments - oldest first
pub async fn list_comments(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = find_post(&state, post_id).await?;

    if !visible_to(&state, &post, viewer.0.as_ref()).await? {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }

    let mut items = Vec::new();
    for comment in state.comments.list_for_post(post.id).await? {
        items.push(comment_response(&state, &comment).await?);
    }

    Ok(HttpResponse::Ok().json(items))
}

/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = find_post(&state, post_id).await?;

    if !visible_to(&state, &post, Some(&identity)).await? {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }

    let req = body.into_inner();
    validate_text(&req.text)?;

    let comment = Comment::new(post.id, identity.user_id, req.text);
    let saved = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(comment_response(&state, &saved).await?))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn update_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    find_post(&state, post_id).await?;
    let mut comment = find_comment(&state, post_id, comment_id).await?;

    if !can_modify(&identity.actor(), &comment) {
        return Err(AppError::SeeOther(detail_url(post_id)));
    }

    let req = body.into_inner();
    validate_text(&req.text)?;
    comment.text = req.text;

    let saved = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(comment_response(&state, &saved).await?))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    find_post(&state, post_id).await?;
    let comment = find_comment(&state, post_id, comment_id).await?;

    if !can_modify(&identity.actor(), &comment) {
        return Err(AppError::SeeOther(detail_url(post_id)));
    }

    state.comments.delete(comment.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
