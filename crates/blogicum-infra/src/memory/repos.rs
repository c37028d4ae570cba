use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::{FeedScope, POSTS_PER_PAGE, Page, PageOf, post_is_visible};

use super::store::MemoryStore;

/// In-memory user repository.
#[derive(Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.inner.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email))
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if !inner.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.users.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory category repository.
#[derive(Clone)]
pub struct MemoryCategoryRepository {
    store: MemoryStore,
}

impl MemoryCategoryRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for MemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.inner.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner.categories.values().any(|c| c.slug == category.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.categories.remove(&id).ok_or(RepoError::NotFound)?;
        // FK behavior: posts keep existing with the reference cleared
        for post in inner.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut categories: Vec<Category> = inner
            .categories
            .values()
            .filter(|c| c.is_published)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

/// In-memory location repository.
#[derive(Clone)]
pub struct MemoryLocationRepository {
    store: MemoryStore,
}

impl MemoryLocationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for MemoryLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.store.inner.read().await.locations.get(&id).cloned())
    }

    async fn insert(&self, location: Location) -> Result<Location, RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.locations.contains_key(&location.id) {
            return Err(RepoError::NotFound);
        }
        inner.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.locations.remove(&id).ok_or(RepoError::NotFound)?;
        for post in inner.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn list_published(&self) -> Result<Vec<Location>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut locations: Vec<Location> = inner
            .locations
            .values()
            .filter(|l| l.is_published)
            .cloned()
            .collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

/// In-memory post repository.
#[derive(Clone)]
pub struct MemoryPostRepository {
    store: MemoryStore,
}

impl MemoryPostRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn page_of(mut posts: Vec<Post>, page: Page) -> PageOf<Post> {
    posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    let total = posts.len() as u64;
    let items = posts
        .into_iter()
        .skip(page.offset() as usize)
        .take(POSTS_PER_PAGE as usize)
        .collect();
    PageOf { items, total }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.inner.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.posts.remove(&id).ok_or(RepoError::NotFound)?;
        // cascade, as the relational schema would
        inner.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn visible_page(
        &self,
        scope: FeedScope,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<PageOf<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| {
                let category_published = p
                    .category_id
                    .map(|id| inner.categories.get(&id).is_some_and(|c| c.is_published));
                post_is_visible(p, category_published, now)
            })
            .filter(|p| match scope {
                FeedScope::Home => true,
                FeedScope::Category(category_id) => p.category_id == Some(category_id),
                FeedScope::Author(author_id) => p.author_id == author_id,
            })
            .cloned()
            .collect();

        Ok(page_of(posts, page))
    }

    async fn author_page(&self, author_id: Uuid, page: Page) -> Result<PageOf<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();

        Ok(page_of(posts, page))
    }
}

/// In-memory comment repository.
#[derive(Clone)]
pub struct MemoryCommentRepository {
    store: MemoryStore,
}

impl MemoryCommentRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.inner.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("Parent post missing".to_string()));
        }
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.comments.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn repos() -> (
        MemoryUserRepository,
        MemoryCategoryRepository,
        MemoryPostRepository,
        MemoryCommentRepository,
    ) {
        let store = MemoryStore::new();
        (
            MemoryUserRepository::new(store.clone()),
            MemoryCategoryRepository::new(store.clone()),
            MemoryPostRepository::new(store.clone()),
            MemoryCommentRepository::new(store),
        )
    }

    fn visible_post(author_id: Uuid, category_id: Option<Uuid>) -> Post {
        Post::new(
            author_id,
            "title".into(),
            "text".into(),
            Some(Utc::now() - TimeDelta::hours(1)),
            category_id,
            None,
        )
    }

    #[tokio::test]
    async fn home_feed_excludes_hidden_posts() {
        let (_, categories, posts, _) = repos();
        let author = Uuid::new_v4();

        let shown = posts.insert(visible_post(author, None)).await.unwrap();

        let mut unpublished = visible_post(author, None);
        unpublished.is_published = false;
        posts.insert(unpublished).await.unwrap();

        let mut scheduled = visible_post(author, None);
        scheduled.pub_date = Utc::now() + TimeDelta::hours(1);
        posts.insert(scheduled).await.unwrap();

        let mut hidden_category = Category::new("t".into(), "d".into(), "hidden".into());
        hidden_category.is_published = false;
        let hidden_category = categories.insert(hidden_category).await.unwrap();
        posts
            .insert(visible_post(author, Some(hidden_category.id)))
            .await
            .unwrap();

        let page = posts
            .visible_page(FeedScope::Home, Utc::now(), Page::default())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, shown.id);
    }

    #[tokio::test]
    async fn feed_orders_newest_publication_first() {
        let (_, _, posts, _) = repos();
        let author = Uuid::new_v4();
        let now = Utc::now();

        let older = {
            let mut p = visible_post(author, None);
            p.pub_date = now - TimeDelta::days(2);
            posts.insert(p).await.unwrap()
        };
        let newer = {
            let mut p = visible_post(author, None);
            p.pub_date = now - TimeDelta::days(1);
            posts.insert(p).await.unwrap()
        };

        let page = posts
            .visible_page(FeedScope::Home, now, Page::default())
            .await
            .unwrap();

        assert_eq!(page.items[0].id, newer.id);
        assert_eq!(page.items[1].id, older.id);
    }

    #[tokio::test]
    async fn feed_pages_are_capped_at_page_size() {
        let (_, _, posts, _) = repos();
        let author = Uuid::new_v4();
        let now = Utc::now();

        for i in 0..(POSTS_PER_PAGE + 3) {
            let mut p = visible_post(author, None);
            p.pub_date = now - TimeDelta::minutes(i as i64 + 1);
            posts.insert(p).await.unwrap();
        }

        let first = posts
            .visible_page(FeedScope::Home, now, Page::new(1))
            .await
            .unwrap();
        let second = posts
            .visible_page(FeedScope::Home, now, Page::new(2))
            .await
            .unwrap();

        assert_eq!(first.items.len(), POSTS_PER_PAGE as usize);
        assert_eq!(second.items.len(), 3);
        assert_eq!(first.total, POSTS_PER_PAGE + 3);
    }

    #[tokio::test]
    async fn author_page_includes_hidden_posts() {
        let (_, _, posts, _) = repos();
        let author = Uuid::new_v4();

        posts.insert(visible_post(author, None)).await.unwrap();
        let mut pending = visible_post(author, None);
        pending.is_published = false;
        posts.insert(pending).await.unwrap();
        // another author's post stays out
        posts
            .insert(visible_post(Uuid::new_v4(), None))
            .await
            .unwrap();

        let page = posts.author_page(author, Page::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_comments() {
        let (_, _, posts, comments) = repos();
        let post = posts.insert(visible_post(Uuid::new_v4(), None)).await.unwrap();
        comments
            .insert(Comment::new(post.id, Uuid::new_v4(), "first".into()))
            .await
            .unwrap();
        comments
            .insert(Comment::new(post.id, Uuid::new_v4(), "second".into()))
            .await
            .unwrap();

        posts.delete(post.id).await.unwrap();

        assert_eq!(comments.count_for_post(post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn comments_list_oldest_first() {
        let (_, _, posts, comments) = repos();
        let post = posts.insert(visible_post(Uuid::new_v4(), None)).await.unwrap();

        let base = Utc::now();
        for i in [3i64, 1, 2] {
            let mut c = Comment::new(post.id, Uuid::new_v4(), format!("c{i}"));
            c.created_at = base + TimeDelta::minutes(i);
            comments.insert(c).await.unwrap();
        }

        let listed = comments.list_for_post(post.id).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let (users, _, _, _) = repos();
        users
            .insert(User::new("alice".into(), "a@example.com".into(), "h".into()))
            .await
            .unwrap();

        let result = users
            .insert(User::new("alice".into(), "b@example.com".into(), "h".into()))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }
}
