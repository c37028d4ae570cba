//! Database connection management and PostgreSQL repositories.

mod connections;
pub mod entity;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, DatabaseConnection};
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};
