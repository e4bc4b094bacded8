use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, PostChanges, PostWithCategories};
use crate::error::RepoError;

/// Generic repository trait shared by every stored entity.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity and return the stored row.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// Post repository.
///
/// Every method that touches associations runs as one unit of work: either all
/// of its writes commit or none of them do.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Load one post together with its categories.
    async fn find_with_categories(&self, id: Uuid)
    -> Result<Option<PostWithCategories>, RepoError>;

    /// Load every post together with its categories, newest first.
    async fn list_with_categories(&self) -> Result<Vec<PostWithCategories>, RepoError>;

    /// Insert a post and its initial associations.
    async fn create_with_categories(
        &self,
        post: Post,
        categories: &BTreeSet<Uuid>,
    ) -> Result<PostWithCategories, RepoError>;

    /// Replace the post's fields and its whole category set together.
    async fn update_with_categories(
        &self,
        id: Uuid,
        changes: PostChanges,
        categories: &BTreeSet<Uuid>,
    ) -> Result<Post, RepoError>;

    /// Swap the post's association set for `categories`.
    ///
    /// Fails with [`RepoError::NotFound`] when the post is gone, and with
    /// [`RepoError::Constraint`] when a category no longer exists.
    async fn replace_categories(
        &self,
        id: Uuid,
        categories: &BTreeSet<Uuid>,
    ) -> Result<(), RepoError>;

    /// Delete a post along with all of its associations.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, oldest first.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    /// The subset of `ids` that refer to stored categories, in one lookup.
    async fn find_existing(&self, ids: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>, RepoError>;

    /// Delete a category that no post references.
    ///
    /// Returns [`RepoError::InUse`] while associations exist.
    async fn delete_unused(&self, id: Uuid) -> Result<(), RepoError>;
}
