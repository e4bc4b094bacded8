use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryRef;

/// Post entity - an article with an optional cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(title: String, content: String, cover_image_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            cover_image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field and bump `updated_at`.
    pub fn apply(&mut self, changes: PostChanges) {
        self.title = changes.title;
        self.content = changes.content;
        self.cover_image_url = changes.cover_image_url;
        self.updated_at = Utc::now();
    }
}

/// Full-field replacement for a post. A `None` cover clears the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
}

/// A post joined with the categories it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithCategories {
    pub post: Post,
    /// Ordered by category name.
    pub categories: Vec<CategoryRef>,
}

impl PostWithCategories {
    pub fn new(post: Post, mut categories: Vec<CategoryRef>) -> Self {
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Self { post, categories }
    }

    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories.iter().map(|c| c.id).collect()
    }
}
