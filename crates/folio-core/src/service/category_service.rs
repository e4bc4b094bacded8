//! Category use-cases.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Category;
use crate::error::{DomainError, RepoError, ValidationError};
use crate::ports::CategoryRepository;
use crate::service::query::{ListQuery, Page, QueryService};
use crate::service::validation::require_text;

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    query: QueryService,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, query: QueryService) -> Self {
        Self { categories, query }
    }

    /// Every category, oldest first.
    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list().await.map_err(DomainError::Repository)
    }

    pub async fn list_page(&self, query: &ListQuery) -> Result<Page<Category>, DomainError> {
        let categories = self.list().await?;
        Ok(self.query.run(categories, query))
    }

    pub async fn create(&self, name: &str) -> Result<Category, DomainError> {
        let name = require_text(name, ValidationError::EmptyName)?;
        let category = self
            .categories
            .insert(Category::new(name))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(detail) => DomainError::Conflict(detail),
                other => DomainError::Repository(other),
            })?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Delete a category. Categories still attached to posts are refused.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.categories.delete_unused(id).await {
            Ok(()) => {
                tracing::info!(category_id = %id, "Category deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::category_not_found(id)),
            Err(RepoError::InUse { posts }) => {
                tracing::debug!(category_id = %id, posts, "Category delete refused");
                Err(DomainError::Conflict(format!(
                    "category is still assigned to {posts} post(s)"
                )))
            }
            Err(other) => Err(DomainError::Repository(other)),
        }
    }
}
