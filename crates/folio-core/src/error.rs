//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(RepoError),
}

impl DomainError {
    pub fn post_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id,
        }
    }

    pub fn category_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity_type: "Category",
            id,
        }
    }
}

/// Rejections raised before any mutation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more submitted category ids do not resolve to a stored category.
    #[error("unknown category ids: {}", .ids.join(", "))]
    UnknownCategory { ids: Vec<String> },

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("category name must not be empty")]
    EmptyName,
}

impl ValidationError {
    pub fn unknown_categories<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::UnknownCategory {
            ids: ids.into_iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A category still referenced by posts cannot be removed.
    #[error("Category is referenced by {posts} post(s)")]
    InUse { posts: u64 },
}
