//! The post visibility rule and feed query types.
//!
//! A post is publicly listable iff it is published itself, its publication
//! date is not in the future, and its category - when it has one - is
//! published too. Posts without a category pass the category condition.
//! This is the single visibility rule for the home feed, the per-category
//! feed and the public per-author feed; the feeds differ only in an extra
//! equality filter, expressed by [`FeedScope`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;

/// Fixed page size for all post feeds.
pub const POSTS_PER_PAGE: u64 = 10;

/// Decide whether `post` is publicly visible at `now`.
///
/// `category_is_published` is the publish flag of the post's category, or
/// `None` when the post has no category.
pub fn post_is_visible(
    post: &Post,
    category_is_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    post.is_published && post.pub_date <= now && category_is_published.unwrap_or(true)
}

/// Which feed is being listed. Scopes narrow the visible set, they never
/// widen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// The home feed: every visible post.
    Home,
    /// Visible posts filed under one category.
    Category(Uuid),
    /// Visible posts by one author.
    Author(Uuid),
}

/// A 1-based page request with the fixed feed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
}

impl Page {
    pub fn new(number: u64) -> Self {
        Self {
            number: number.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * POSTS_PER_PAGE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One page of results plus the total match count, enough for the caller to
/// derive page counts.
#[derive(Debug, Clone)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total: u64,
}
