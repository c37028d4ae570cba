//! PostgreSQL repository implementations.
//!
//! The visibility condition here is the SQL rendering of
//! `blogicum_core::visibility::post_is_visible`: published post, publication
//! date in the past, and the category - when joined - published as well.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::visibility::{FeedScope, POSTS_PER_PAGE, Page, PageOf};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn list_published(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::IsPublished.eq(true))
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_published(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .filter(location::Column::IsPublished.eq(true))
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn visible_page(
        &self,
        scope: FeedScope,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<PageOf<Post>, RepoError> {
        let visible = Condition::all()
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(now))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );

        let mut query = PostEntity::find()
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(visible)
            .order_by_desc(post::Column::PubDate);

        match scope {
            FeedScope::Home => {}
            FeedScope::Category(category_id) => {
                query = query.filter(post::Column::CategoryId.eq(category_id));
            }
            FeedScope::Author(author_id) => {
                query = query.filter(post::Column::AuthorId.eq(author_id));
            }
        }

        let paginator = query.paginate(&self.db, POSTS_PER_PAGE);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let items = paginator
            .fetch_page(page.number - 1)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(PageOf {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn author_page(&self, author_id: Uuid, page: Page) -> Result<PageOf<Post>, RepoError> {
        let paginator = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::PubDate)
            .paginate(&self.db, POSTS_PER_PAGE);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let items = paginator
            .fetch_page(page.number - 1)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(PageOf {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }
}
