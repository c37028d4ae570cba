//! Category and location handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::visibility::FeedScope;
use blogicum_shared::dto::{CategoryResponse, LocationResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::PageQuery;
use super::posts::paginated_posts;

/// GET /api/category/{slug}/posts - the per-category feed
///
/// A missing or unpublished category is a 404; its posts would all be
/// hidden anyway.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|c| c.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Category '{slug}' not found")))?;

    let page = query.page();
    let page_of = state
        .posts
        .visible_page(FeedScope::Category(category.id), Utc::now(), page)
        .await?;

    Ok(HttpResponse::Ok().json(paginated_posts(&state, page_of, page).await?))
}

/// GET /api/categories - published categories, by title
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .categories
        .list_published()
        .await?
        .into_iter()
        .map(|c| CategoryResponse {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
        })
        .collect();

    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/locations - published locations, by name
pub async fn list_locations(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let locations: Vec<LocationResponse> = state
        .locations
        .list_published()
        .await?
        .into_iter()
        .map(|l| LocationResponse { id: l.id, name: l.name })
        .collect();

    Ok(HttpResponse::Ok().json(locations))
}
