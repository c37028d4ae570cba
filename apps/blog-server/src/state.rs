//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_infra::database::{
    DatabaseConfig, DatabaseConnection, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresLocationRepository, PostgresPostRepository, PostgresUserRepository,
};
use blogicum_infra::memory::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryStore, MemoryUserRepository,
};

/// Shared application state: one repository handle per entity.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// With a database configuration the Postgres repositories are used;
    /// without one (or when the connection fails) the server falls back to
    /// the in-memory store.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        if let Some(config) = db_config {
            match DatabaseConnection::init(config).await {
                Ok(connection) => {
                    let db = connection.conn;
                    return Self {
                        users: Arc::new(PostgresUserRepository::new(db.clone())),
                        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
                        locations: Arc::new(PostgresLocationRepository::new(db.clone())),
                        posts: Arc::new(PostgresPostRepository::new(db.clone())),
                        comments: Arc::new(PostgresCommentRepository::new(db)),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory()
    }

    /// State backed entirely by the in-memory store.
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(MemoryUserRepository::new(store.clone())),
            categories: Arc::new(MemoryCategoryRepository::new(store.clone())),
            locations: Arc::new(MemoryLocationRepository::new(store.clone())),
            posts: Arc::new(MemoryPostRepository::new(store.clone())),
            comments: Arc::new(MemoryCommentRepository::new(store)),
        }
    }
}
