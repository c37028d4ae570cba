use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};

#[derive(Default)]
pub(crate) struct StoreInner {
    pub users: HashMap<Uuid, User>,
    pub categories: HashMap<Uuid, Category>,
    pub locations: HashMap<Uuid, Location>,
    pub posts: HashMap<Uuid, Post>,
    pub comments: HashMap<Uuid, Comment>,
}

/// Shared in-memory backing store, one per process.
///
/// Cloning is cheap; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
