//! End-to-end handler tests over the in-memory repositories.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::handlers;
use crate::state::AppState;

struct TestCtx {
    state: AppState,
    token_service: Arc<dyn TokenService>,
    password_service: Arc<dyn PasswordService>,
}

impl TestCtx {
    fn new() -> Self {
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }));
        Self {
            state: AppState::in_memory(),
            token_service,
            password_service: Arc::new(Argon2PasswordService::new()),
        }
    }

    async fn user(&self, username: &str) -> User {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unusable-hash".to_string(),
        );
        self.state.users.insert(user).await.unwrap()
    }

    async fn staff(&self, username: &str) -> User {
        let mut user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unusable-hash".to_string(),
        );
        user.is_staff = true;
        self.state.users.insert(user).await.unwrap()
    }

    fn token_for(&self, user: &User) -> String {
        self.token_service
            .generate_token(user.id, &user.username, user.is_staff)
            .unwrap()
    }

    async fn post_by(&self, author: &User) -> Post {
        let post = Post::new(
            author.id,
            "A post".to_string(),
            "Some text".to_string(),
            Some(Utc::now() - TimeDelta::hours(1)),
            None,
            None,
        );
        self.state.posts.insert(post).await.unwrap()
    }
}

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .app_data(web::Data::new($ctx.token_service.clone()))
                .app_data(web::Data::new($ctx.password_service.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_rt::test]
async fn health_endpoint_answers_ok() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn register_issues_a_token_and_duplicates_conflict() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "wonderland123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));

    // same username again
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "wonderland123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn login_round_trip() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let hash = ctx.password_service.hash("s3cret-pass").unwrap();
    let mut user = User::new("bob".to_string(), "bob@example.com".to_string(), hash);
    user.first_name = "Bob".to_string();
    ctx.state.users.insert(user).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "bob", "password": "s3cret-pass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "bob");
    assert_eq!(body["first_name"], "Bob");
}

#[actix_rt::test]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let hash = ctx.password_service.hash("right-password").unwrap();
    ctx.state
        .users
        .insert(User::new("carol".to_string(), "c@example.com".to_string(), hash))
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "carol", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn creating_a_post_requires_authentication() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "t", "text": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn post_without_pub_date_is_stamped_with_now() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("dave").await;

    let before = Utc::now();
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&ctx.token_for(&author)))
        .set_json(json!({"title": "Fresh", "text": "body"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let pub_date: chrono::DateTime<Utc> =
        body["pub_date"].as_str().unwrap().parse().unwrap();
    assert!(pub_date >= before && pub_date <= Utc::now());
    assert_eq!(body["author"]["username"], "dave");
}

#[actix_rt::test]
async fn future_post_is_absent_from_the_home_feed() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("erin").await;

    // published now
    ctx.post_by(&author).await;

    // scheduled one hour ahead
    let scheduled = Post::new(
        author.id,
        "Scheduled".to_string(),
        "later".to_string(),
        Some(Utc::now() + TimeDelta::hours(1)),
        None,
        None,
    );
    ctx.state.posts.insert(scheduled).await.unwrap();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request())
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["title"], "A post");
}

#[actix_rt::test]
async fn unpublished_category_hides_its_posts_from_the_feed() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("frank").await;

    let mut category = Category::new("Hidden".to_string(), "d".to_string(), "hidden".to_string());
    category.is_published = false;
    let category = ctx.state.categories.insert(category).await.unwrap();

    let post = Post::new(
        author.id,
        "Filed".to_string(),
        "text".to_string(),
        Some(Utc::now() - TimeDelta::hours(1)),
        Some(category.id),
        None,
    );
    ctx.state.posts.insert(post).await.unwrap();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request())
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_items"], 0);

    // and the category feed itself is a 404
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/category/hidden/posts")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn missing_category_and_profile_are_not_found() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/category/no-such/posts")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/profile/nobody/posts")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn hidden_post_detail_is_404_for_readers_but_not_the_author() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("grace").await;

    let mut post = Post::new(
        author.id,
        "Draft".to_string(),
        "wip".to_string(),
        Some(Utc::now() - TimeDelta::hours(1)),
        None,
        None,
    );
    post.is_published = false;
    let post = ctx.state.posts.insert(post).await.unwrap();
    let url = format!("/api/posts/{}", post.id);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri(&url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&url)
            .insert_header(bearer(&ctx.token_for(&author)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("henry").await;
    let stranger = ctx.user("iris").await;

    let post = ctx.post_by(&author).await;
    let url = format!("/api/posts/{}", post.id);

    let req = test::TestRequest::put()
        .uri(&url)
        .insert_header(bearer(&ctx.token_for(&stranger)))
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        url
    );

    let unchanged = ctx.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "A post");
}

#[actix_rt::test]
async fn non_author_delete_redirects_and_keeps_the_post() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("jack").await;
    let stranger = ctx.user("kate").await;

    let post = ctx.post_by(&author).await;
    let url = format!("/api/posts/{}", post.id);

    let req = test::TestRequest::delete()
        .uri(&url)
        .insert_header(bearer(&ctx.token_for(&stranger)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(ctx.state.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn staff_may_edit_someone_elses_post() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("liam").await;
    let admin = ctx.staff("root").await;

    let post = ctx.post_by(&author).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&ctx.token_for(&admin)))
        .set_json(json!({"title": "Moderated"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Moderated");
    // authorship never moves
    assert_eq!(body["author"]["username"], "liam");
}

#[actix_rt::test]
async fn comments_are_listed_oldest_first() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("mona").await;
    let post = ctx.post_by(&author).await;

    let base = Utc::now();
    for (i, offset) in [("late", 2i64), ("early", 0), ("middle", 1)] {
        let mut comment = Comment::new(post.id, author.id, i.to_string());
        comment.created_at = base + TimeDelta::minutes(offset);
        ctx.state.comments.insert(comment).await.unwrap();
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts/{}/comments", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let texts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["early", "middle", "late"]);
}

#[actix_rt::test]
async fn deleting_a_post_removes_its_comments() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("nina").await;
    let post = ctx.post_by(&author).await;

    ctx.state
        .comments
        .insert(Comment::new(post.id, author.id, "gone soon".to_string()))
        .await
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&ctx.token_for(&author)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        ctx.state.comments.count_for_post(post.id).await.unwrap(),
        0
    );
}

#[actix_rt::test]
async fn non_author_comment_edit_redirects_to_the_post() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("omar").await;
    let stranger = ctx.user("pam").await;
    let post = ctx.post_by(&author).await;

    let comment = ctx
        .state
        .comments
        .insert(Comment::new(post.id, author.id, "mine".to_string()))
        .await
        .unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}/comments/{}", post.id, comment.id))
        .insert_header(bearer(&ctx.token_for(&stranger)))
        .set_json(json!({"text": "hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/api/posts/{}", post.id)
    );

    let unchanged = ctx
        .state
        .comments
        .find_by_id(comment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.text, "mine");
}

#[actix_rt::test]
async fn profile_feed_shows_hidden_posts_only_to_the_owner() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("quinn").await;

    ctx.post_by(&author).await;
    let mut draft = Post::new(
        author.id,
        "Draft".to_string(),
        "wip".to_string(),
        Some(Utc::now() - TimeDelta::hours(1)),
        None,
        None,
    );
    draft.is_published = false;
    ctx.state.posts.insert(draft).await.unwrap();

    let url = "/api/profile/quinn/posts";

    let resp = test::call_service(&app, test::TestRequest::get().uri(url).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_items"], 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(url)
            .insert_header(bearer(&ctx.token_for(&author)))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_items"], 2);
}

#[actix_rt::test]
async fn explicit_null_detaches_the_category_but_absence_keeps_it() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("sven").await;

    let category = ctx
        .state
        .categories
        .insert(Category::new("Travel".to_string(), "d".to_string(), "travel".to_string()))
        .await
        .unwrap();

    let post = Post::new(
        author.id,
        "Filed".to_string(),
        "text".to_string(),
        Some(Utc::now() - TimeDelta::hours(1)),
        Some(category.id),
        None,
    );
    let post = ctx.state.posts.insert(post).await.unwrap();
    let url = format!("/api/posts/{}", post.id);
    let token = ctx.token_for(&author);

    // a body that omits the field leaves the reference alone
    let req = test::TestRequest::put()
        .uri(&url)
        .insert_header(bearer(&token))
        .set_json(json!({"title": "Renamed"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["category"]["slug"], "travel");

    // an explicit null clears it
    let req = test::TestRequest::put()
        .uri(&url)
        .insert_header(bearer(&token))
        .set_json(json!({"category_id": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["category"].is_null());

    let stored = ctx.state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert!(stored.category_id.is_none());
}

#[actix_rt::test]
async fn blank_title_fails_validation() {
    let ctx = TestCtx::new();
    let app = test_app!(ctx);
    let author = ctx.user("rosa").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&ctx.token_for(&author)))
        .set_json(json!({"title": "   ", "text": "body"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
