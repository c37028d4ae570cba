use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::Authored;

/// Post entity - a dated article owned by its author.
///
/// Category and location are optional references. `pub_date` may lie in the
/// future, which keeps the post out of public feeds until the date passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. When no publication date is supplied the creation
    /// time is stamped, so a plain submit publishes immediately.
    pub fn new(
        author_id: Uuid,
        title: String,
        text: String,
        pub_date: Option<DateTime<Utc>>,
        category_id: Option<Uuid>,
        location_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            pub_date: pub_date.unwrap_or(now),
            category_id,
            location_id,
            is_published: true,
            created_at: now,
        }
    }
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}
