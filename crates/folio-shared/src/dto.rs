//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cover dimensions advertised to public readers.
pub const COVER_WIDTH: u32 = 1200;
pub const COVER_HEIGHT: u32 = 630;

/// Body of `POST /admin/posts` and `PUT /admin/posts/{id}`.
///
/// Category ids stay strings here: identifiers that are not UUIDs are reported
/// as unknown categories rather than as a malformed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    #[serde(default, rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
    pub category_ids: Vec<String>,
}

/// Body of `POST /admin/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// `{id, name}` reference joined onto posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRefResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverImage {
    pub url: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// `GET /posts/{id}` - the reader-facing post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image: CoverImage,
    pub categories: Vec<CategoryRefResponse>,
}

/// `GET /admin/posts/{id}` - the edit form's view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
    pub categories: Vec<CategoryRefResponse>,
}

/// Result of `PUT /admin/posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the admin post listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<CategoryRefResponse>,
}

/// A page of an admin listing plus the view state that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: usize,
    pub total_items: usize,
    pub view: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
