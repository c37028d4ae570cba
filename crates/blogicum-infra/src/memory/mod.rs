//! In-memory repository implementations.
//!
//! Used when no database is configured, and by the server's integration
//! tests. Data is lost on process restart. All repositories share one
//! [`MemoryStore`] so that cross-entity rules (the comment cascade, the
//! category join in the visibility filter) behave like the relational
//! schema.

mod repos;
mod store;

pub use repos::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryUserRepository,
};
pub use store::MemoryStore;
