use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::RepoError;
use crate::visibility::{FeedScope, Page, PageOf};

/// Generic repository trait defining standard CRUD operations.
///
/// `insert` and `update` are split rather than folded into a single upsert:
/// entities carry client-generated UUIDs, so the store cannot tell a create
/// from an update on its own.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with account lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Published categories, ordered by title.
    async fn list_published(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// Published locations, ordered by name.
    async fn list_published(&self) -> Result<Vec<Location>, RepoError>;
}

/// Post repository.
///
/// Deleting a post cascades to its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of publicly visible posts in `scope`, newest publication
    /// date first. Visibility is evaluated at `now`.
    async fn visible_page(
        &self,
        scope: FeedScope,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<PageOf<Post>, RepoError>;

    /// One page of all posts by `author_id`, visible or not, newest
    /// publication date first. Serves authors browsing their own profile.
    async fn author_page(&self, author_id: Uuid, page: Page) -> Result<PageOf<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments under a post, ordered by creation time ascending.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
