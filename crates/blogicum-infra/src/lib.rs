//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`:
//! SeaORM/PostgreSQL repositories, in-memory repositories for development
//! and tests, and the JWT/Argon2 authentication services.

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::DatabaseConnection;
pub use memory::MemoryStore;
