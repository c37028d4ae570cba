//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profiles;

use actix_web::web;
use serde::Deserialize;

use blogicum_core::visibility::Page;

/// Query string for paginated feeds: `?page=2`, 1-based.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        self.page.map(Page::new).unwrap_or_default()
    }
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/profile", web::put().to(auth::update_profile)),
            )
            // Posts
            .route("/posts", web::get().to(posts::list_posts))
            .route("/posts", web::post().to(posts::create_post))
            .route("/posts/{post_id}", web::get().to(posts::get_post))
            .route("/posts/{post_id}", web::put().to(posts::update_post))
            .route("/posts/{post_id}", web::delete().to(posts::delete_post))
            // Comments, nested under their post
            .route(
                "/posts/{post_id}/comments",
                web::get().to(comments::list_comments),
            )
            .route(
                "/posts/{post_id}/comments",
                web::post().to(comments::add_comment),
            )
            .route(
                "/posts/{post_id}/comments/{comment_id}",
                web::put().to(comments::update_comment),
            )
            .route(
                "/posts/{post_id}/comments/{comment_id}",
                web::delete().to(comments::delete_comment),
            )
            // Categories and locations
            .route(
                "/category/{slug}/posts",
                web::get().to(categories::category_posts),
            )
            .route("/categories", web::get().to(categories::list_categories))
            .route("/locations", web::get().to(categories::list_locations))
            // Profiles
            .route("/profile/{username}", web::get().to(profiles::get_profile))
            .route(
                "/profile/{username}/posts",
                web::get().to(profiles::profile_posts),
            ),
    );
}
