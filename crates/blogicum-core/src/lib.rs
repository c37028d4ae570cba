//! # Blogicum Core
//!
//! The domain layer of the Blogicum blogging platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the entity types, the post visibility rule, and the authorship check.

pub mod authz;
pub mod domain;
pub mod error;
pub mod ports;
pub mod visibility;

pub use error::RepoError;
