//! # Blogicum Shared
//!
//! Wire types shared between server and clients: request/response DTOs and
//! the error envelope.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, Paginated};
