//! Post use-cases: read, list, create, update with categories, delete.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostChanges, PostWithCategories};
use crate::error::{DomainError, RepoError, ValidationError};
use crate::ports::{CategoryRepository, PostRepository};
use crate::service::query::{ListQuery, Page, QueryService};
use crate::service::validation::{
    ValidatedCategories, require_text, validate_category_set, validate_submitted_categories,
};

/// Structurally valid input for creating or fully replacing a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    /// May contain duplicates; the gate collapses them.
    pub category_ids: Vec<Uuid>,
    /// Submitted category identifiers that are not UUIDs.
    pub malformed_category_ids: Vec<String>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    query: QueryService,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        query: QueryService,
    ) -> Self {
        Self {
            posts,
            categories,
            query,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<PostWithCategories, DomainError> {
        self.posts
            .find_with_categories(id)
            .await
            .map_err(DomainError::Repository)?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<PostWithCategories>, DomainError> {
        self.posts
            .list_with_categories()
            .await
            .map_err(DomainError::Repository)
    }

    pub async fn list_page(
        &self,
        query: &ListQuery,
    ) -> Result<Page<PostWithCategories>, DomainError> {
        let posts = self.list().await?;
        Ok(self.query.run(posts, query))
    }

    pub async fn create(&self, input: PostInput) -> Result<PostWithCategories, DomainError> {
        let changes = Self::changes(&input)?;
        let categories = self.validate_categories(&input).await?;

        let post = Post::new(changes.title, changes.content, changes.cover_image_url);
        let created = self
            .posts
            .create_with_categories(post, categories.as_set())
            .await
            .map_err(|e| Self::map_write_error(e, None))?;

        tracing::info!(
            post_id = %created.post.id,
            categories = created.categories.len(),
            "Post created"
        );
        Ok(created)
    }

    /// Replace every field and the whole category set of a post.
    ///
    /// Validation finishes before the store is touched; the store then applies
    /// the field update and the association swap as one transaction.
    pub async fn update(&self, id: Uuid, input: PostInput) -> Result<Post, DomainError> {
        let changes = Self::changes(&input)?;
        let categories = self.validate_categories(&input).await?;

        let post = self
            .posts
            .update_with_categories(id, changes, categories.as_set())
            .await
            .map_err(|e| Self::map_write_error(e, Some(id)))?;

        tracing::info!(post_id = %id, categories = categories.len(), "Post updated");
        Ok(post)
    }

    /// Swap only the category set of a post.
    pub async fn replace_categories(&self, id: Uuid, category_ids: &[Uuid]) -> Result<(), DomainError> {
        let categories = validate_category_set(self.categories.as_ref(), category_ids).await?;

        self.posts
            .replace_categories(id, categories.as_set())
            .await
            .map_err(|e| Self::map_write_error(e, Some(id)))?;

        tracing::debug!(post_id = %id, categories = categories.len(), "Post categories replaced");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.posts
            .delete(id)
            .await
            .map_err(|e| Self::map_write_error(e, Some(id)))?;

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn validate_categories(
        &self,
        input: &PostInput,
    ) -> Result<ValidatedCategories, DomainError> {
        validate_submitted_categories(
            self.categories.as_ref(),
            &input.category_ids,
            &input.malformed_category_ids,
        )
        .await
    }

    fn changes(input: &PostInput) -> Result<PostChanges, ValidationError> {
        Ok(PostChanges {
            title: require_text(&input.title, ValidationError::EmptyTitle)?,
            content: input.content.clone(),
            cover_image_url: input.cover_image_url.clone(),
        })
    }

    fn map_write_error(err: RepoError, id: Option<Uuid>) -> DomainError {
        match (err, id) {
            (RepoError::NotFound, Some(id)) => DomainError::post_not_found(id),
            // A category vanished between validation and commit.
            (RepoError::Constraint(detail), _) => DomainError::Conflict(detail),
            (other, _) => DomainError::Repository(other),
        }
    }
}
