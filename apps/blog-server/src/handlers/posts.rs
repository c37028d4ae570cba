//! Post handlers: feed, detail, create, edit, delete.
//!
//! Edit and delete are gated by the authorship check: a non-author is sent
//! back to the post's detail URL instead of receiving a hard error. Detail
//! answers 404 for posts that are not publicly visible, unless the
//! requester is the author (or staff) - authors see their own pending and
//! scheduled posts.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::authz::can_modify;
use blogicum_core::domain::Post;
use blogicum_core::visibility::{FeedScope, POSTS_PER_PAGE, Page, PageOf, post_is_visible};
use blogicum_shared::Paginated;
use blogicum_shared::dto::{
    CategorySummary, CreatePostRequest, LocationSummary, PostDetailResponse, PostResponse,
    ProfileResponse, UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::PageQuery;
use super::comments::comment_response;

const MAX_TITLE_LEN: usize = 256;

pub(crate) fn detail_url(post_id: Uuid) -> String {
    format!("/api/posts/{post_id}")
}

fn validate_post_fields(title: &str, text: &str) -> AppResult<()> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push("title must not be empty".to_string());
    } else if title.len() > MAX_TITLE_LEN {
        errors.push(format!("title exceeds {MAX_TITLE_LEN} characters"));
    }
    if text.trim().is_empty() {
        errors.push("text must not be empty".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Resolve a referenced category/location, rejecting dangling ids.
async fn check_references(
    state: &AppState,
    category_id: Option<Uuid>,
    location_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(id) = category_id {
        state
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Unknown category".to_string()))?;
    }
    if let Some(id) = location_id {
        state
            .locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Unknown location".to_string()))?;
    }
    Ok(())
}

/// Assemble the response body for one post: author, category and location
/// resolved, comment count attached.
pub(crate) async fn post_response(state: &AppState, post: &Post) -> AppResult<PostResponse> {
    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::Internal("Post author missing".to_string()))?;

    let category = match post.category_id {
        Some(id) => state.categories.find_by_id(id).await?.map(|c| CategorySummary {
            id: c.id,
            title: c.title,
            slug: c.slug,
        }),
        None => None,
    };

    let location = match post.location_id {
        Some(id) => state
            .locations
            .find_by_id(id)
            .await?
            .map(|l| LocationSummary { id: l.id, name: l.name }),
        None => None,
    };

    let comment_count = state.comments.count_for_post(post.id).await?;

    Ok(PostResponse {
        id: post.id,
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date,
        author: ProfileResponse {
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
        },
        category,
        location,
        is_published: post.is_published,
        comment_count,
        created_at: post.created_at,
    })
}

/// Turn a repository page into the wire envelope.
pub(crate) async fn paginated_posts(
    state: &AppState,
    page_of: PageOf<Post>,
    page: Page,
) -> AppResult<Paginated<PostResponse>> {
    let mut items = Vec::with_capacity(page_of.items.len());
    for post in &page_of.items {
        items.push(post_response(state, post).await?);
    }
    Ok(Paginated::new(items, page.number, POSTS_PER_PAGE, page_of.total))
}

/// The visibility rule as seen by one requester: authors and staff see
/// their hidden posts, everyone else only public ones.
pub(crate) async fn visible_to(
    state: &AppState,
    post: &Post,
    viewer: Option<&Identity>,
) -> AppResult<bool> {
    if let Some(viewer) = viewer {
        if can_modify(&viewer.actor(), post) {
            return Ok(true);
        }
    }

    let category_published = match post.category_id {
        Some(id) => Some(
            state
                .categories
                .find_by_id(id)
                .await?
                .is_some_and(|c| c.is_published),
        ),
        None => None,
    };

    Ok(post_is_visible(post, category_published, Utc::now()))
}

/// Fetch a post or answer 404.
pub(crate) async fn find_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))
}

/// GET /api/posts - the home feed
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let page_of = state
        .posts
        .visible_page(FeedScope::Home, Utc::now(), page)
        .await?;

    Ok(HttpResponse::Ok().json(paginated_posts(&state, page_of, page).await?))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_post_fields(&req.title, &req.text)?;
    check_references(&state, req.category_id, req.location_id).await?;

    // The author is the requester, fixed here and never editable.
    let post = Post::new(
        identity.user_id,
        req.title,
        req.text,
        req.pub_date,
        req.category_id,
        req.location_id,
    );
    let saved = state.posts.insert(post).await?;

    tracing::info!(post_id = %saved.id, author = %identity.username, "Post created");

    Ok(HttpResponse::Created().json(post_response(&state, &saved).await?))
}

/// GET /api/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = find_post(&state, post_id).await?;

    if !visible_to(&state, &post, viewer.0.as_ref()).await? {
        return Err(AppError::NotFound(format!("Post {post_id} not found")));
    }

    let mut comments = Vec::new();
    for comment in state.comments.list_for_post(post.id).await? {
        comments.push(comment_response(&state, &comment).await?);
    }

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(&state, &post).await?,
        comments,
    }))
}

/// PUT /api/posts/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let mut post = find_post(&state, post_id).await?;

    if !can_modify(&identity.actor(), &post) {
        return Err(AppError::SeeOther(detail_url(post_id)));
    }

    let req = body.into_inner();
    if let Some(title) = req.title {
        post.title = title;
    }
    if let Some(text) = req.text {
        post.text = text;
    }
    validate_post_fields(&post.title, &post.text)?;

    if let Some(pub_date) = req.pub_date {
        post.pub_date = pub_date;
    }
    check_references(&state, req.category_id.flatten(), req.location_id.flatten()).await?;
    // `Some(None)` detaches the reference, absent leaves it alone
    if let Some(category_id) = req.category_id {
        post.category_id = category_id;
    }
    if let Some(location_id) = req.location_id {
        post.location_id = location_id;
    }
    if let Some(is_published) = req.is_published {
        post.is_published = is_published;
    }

    let saved = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(post_response(&state, &saved).await?))
}

/// DELETE /api/posts/{post_id} - cascades to comments
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = find_post(&state, post_id).await?;

    if !can_modify(&identity.actor(), &post) {
        return Err(AppError::SeeOther(detail_url(post_id)));
    }

    state.posts.delete(post.id).await?;

    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
