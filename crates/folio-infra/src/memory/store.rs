//! In-memory content store - used when no database is configured and in tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Category, Post, PostChanges, PostWithCategories};
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, CategoryRepository, PostRepository};

/// Committed table state.
#[derive(Debug, Clone, Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    categories: HashMap<Uuid, Category>,
    /// `(post_id, category_id)`; the set itself enforces pair uniqueness.
    links: BTreeSet<(Uuid, Uuid)>,
}

impl Tables {
    fn joined(&self, post: &Post) -> PostWithCategories {
        let categories = self
            .links
            .range((post.id, Uuid::nil())..=(post.id, Uuid::from_u128(u128::MAX)))
            .filter_map(|(_, category_id)| self.categories.get(category_id))
            .map(Category::to_ref)
            .collect();
        PostWithCategories::new(post.clone(), categories)
    }

    fn unlink_post(&mut self, post_id: Uuid) -> usize {
        let before = self.links.len();
        self.links.retain(|(linked, _)| *linked != post_id);
        before - self.links.len()
    }

    /// Insert links, enforcing the same foreign keys as the SQL schema.
    fn link_post(&mut self, post_id: Uuid, categories: &BTreeSet<Uuid>) -> Result<(), RepoError> {
        if !self.posts.contains_key(&post_id) {
            return Err(RepoError::NotFound);
        }
        for category_id in categories {
            if !self.categories.contains_key(category_id) {
                return Err(RepoError::Constraint(format!(
                    "category {category_id} does not exist"
                )));
            }
            self.links.insert((post_id, *category_id));
        }
        Ok(())
    }

    fn references_to(&self, category_id: Uuid) -> u64 {
        self.links
            .iter()
            .filter(|(_, linked)| *linked == category_id)
            .count() as u64
    }
}

/// Content store backed by plain collections under an async `RwLock`.
///
/// Writes run against a staged copy of the tables while holding the write
/// guard; the copy replaces the committed tables only when the whole unit of
/// work succeeds. Readers therefore never see a half-applied write.
/// Note: Data is lost on process restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` as one transaction.
    async fn transaction<T, F>(&self, work: F) -> Result<T, RepoError>
    where
        F: FnOnce(&mut Tables) -> Result<T, RepoError>,
    {
        let mut committed = self.tables.write().await;
        let mut staged = committed.clone();
        let value = work(&mut staged)?;
        *committed = staged;
        Ok(value)
    }

    /// Number of association rows, across all posts.
    pub async fn link_count(&self) -> usize {
        self.tables.read().await.links.len()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.transaction(|tables| {
            if tables.posts.contains_key(&entity.id) {
                return Err(RepoError::Constraint("post already exists".to_string()));
            }
            tables.posts.insert(entity.id, entity.clone());
            Ok(entity)
        })
        .await
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_with_categories(
        &self,
        id: Uuid,
    ) -> Result<Option<PostWithCategories>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| tables.joined(post)))
    }

    async fn list_with_categories(&self) -> Result<Vec<PostWithCategories>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.posts.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(posts.into_iter().map(|post| tables.joined(post)).collect())
    }

    async fn create_with_categories(
        &self,
        post: Post,
        categories: &BTreeSet<Uuid>,
    ) -> Result<PostWithCategories, RepoError> {
        self.transaction(|tables| {
            if tables.posts.contains_key(&post.id) {
                return Err(RepoError::Constraint("post already exists".to_string()));
            }
            let id = post.id;
            tables.posts.insert(id, post);
            tables.link_post(id, categories)?;
            Ok(tables.joined(&tables.posts[&id]))
        })
        .await
    }

    async fn update_with_categories(
        &self,
        id: Uuid,
        changes: PostChanges,
        categories: &BTreeSet<Uuid>,
    ) -> Result<Post, RepoError> {
        self.transaction(|tables| {
            let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
            post.apply(changes);
            let updated = post.clone();

            tables.unlink_post(id);
            tables.link_post(id, categories)?;
            Ok(updated)
        })
        .await
    }

    async fn replace_categories(
        &self,
        id: Uuid,
        categories: &BTreeSet<Uuid>,
    ) -> Result<(), RepoError> {
        self.transaction(|tables| {
            if !tables.posts.contains_key(&id) {
                return Err(RepoError::NotFound);
            }
            let removed = tables.unlink_post(id);
            tables.link_post(id, categories)?;
            tracing::debug!(
                post_id = %id,
                removed,
                inserted = categories.len(),
                "Post associations replaced"
            );
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.transaction(|tables| {
            tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
            tables.unlink_post(id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, entity: Category) -> Result<Category, RepoError> {
        self.transaction(|tables| {
            if tables.categories.contains_key(&entity.id) {
                return Err(RepoError::Constraint("category already exists".to_string()));
            }
            tables.categories.insert(entity.id, entity.clone());
            Ok(entity)
        })
        .await
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_existing(&self, ids: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter(|id| tables.categories.contains_key(id))
            .copied()
            .collect())
    }

    async fn delete_unused(&self, id: Uuid) -> Result<(), RepoError> {
        self.transaction(|tables| {
            if !tables.categories.contains_key(&id) {
                return Err(RepoError::NotFound);
            }
            let posts = tables.references_to(id);
            if posts > 0 {
                return Err(RepoError::InUse { posts });
            }
            tables.categories.remove(&id);
            Ok(())
        })
        .await
    }
}
