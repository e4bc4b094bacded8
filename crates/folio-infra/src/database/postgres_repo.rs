//! PostgreSQL repository implementations.
//!
//! Every write that touches `post_categories` runs inside one explicit
//! transaction: `begin`, the unit of work, then `commit` on success or
//! `rollback` on any error.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::domain::{Category, CategoryRef, Post, PostChanges, PostWithCategories};
use folio_core::error::RepoError;
use folio_core::ports::{CategoryRepository, PostRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

fn joined(model: post::Model, categories: Vec<category::Model>) -> PostWithCategories {
    PostWithCategories::new(
        model.into(),
        categories.into_iter().map(CategoryRef::from).collect(),
    )
}

/// Delete every association of `post_id`, then insert one row per category.
async fn replace_links<C>(
    conn: &C,
    post_id: Uuid,
    categories: &BTreeSet<Uuid>,
) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    let removed = PostCategoryEntity::delete_many()
        .filter(post_category::Column::PostId.eq(post_id))
        .exec(conn)
        .await
        .map_err(map_db_err)?;

    if !categories.is_empty() {
        PostCategoryEntity::insert_many(
            categories
                .iter()
                .map(|category_id| post_category::link(post_id, *category_id)),
        )
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;
    }

    tracing::debug!(
        post_id = %post_id,
        removed = removed.rows_affected,
        inserted = categories.len(),
        "Post associations replaced"
    );
    Ok(())
}

/// Lock the post row for the rest of the transaction.
async fn lock_post(txn: &DatabaseTransaction, id: Uuid) -> Result<post::Model, RepoError> {
    PostEntity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or(RepoError::NotFound)
}

/// Commit `result` or roll the transaction back.
async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, RepoError>,
) -> Result<T, RepoError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(map_db_err)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::warn!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

impl PostgresPostRepository {
    async fn update_in(
        txn: &DatabaseTransaction,
        id: Uuid,
        changes: PostChanges,
        categories: &BTreeSet<Uuid>,
    ) -> Result<Post, RepoError> {
        let mut active = lock_post(txn, id).await?.into_active_model();
        active.title = Set(changes.title);
        active.content = Set(changes.content);
        active.cover_image_url = Set(changes.cover_image_url);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(txn).await.map_err(map_db_err)?;
        replace_links(txn, id, categories).await?;
        Ok(updated.into())
    }

    async fn create_in(
        txn: &DatabaseTransaction,
        post: Post,
        categories: &BTreeSet<Uuid>,
    ) -> Result<PostWithCategories, RepoError> {
        let id = post.id;
        let active: post::ActiveModel = post.into();
        let inserted = active.insert(txn).await.map_err(map_db_err)?;
        replace_links(txn, id, categories).await?;

        let refs = if categories.is_empty() {
            Vec::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(categories.iter().copied()))
                .all(txn)
                .await
                .map_err(map_db_err)?
        };
        Ok(joined(inserted, refs))
    }

    async fn delete_in(txn: &DatabaseTransaction, id: Uuid) -> Result<(), RepoError> {
        lock_post(txn, id).await?;
        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(id))
            .exec(txn)
            .await
            .map_err(map_db_err)?;

        let deleted = PostEntity::delete_by_id(id)
            .exec(txn)
            .await
            .map_err(map_db_err)?;
        if deleted.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

impl PostgresCategoryRepository {
    async fn delete_unused_in(txn: &DatabaseTransaction, id: Uuid) -> Result<(), RepoError> {
        CategoryEntity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let posts = PostCategoryEntity::find()
            .filter(post_category::Column::CategoryId.eq(id))
            .count(txn)
            .await
            .map_err(map_db_err)?;
        if posts > 0 {
            return Err(RepoError::InUse { posts });
        }

        CategoryEntity::delete_by_id(id)
            .exec(txn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_with_categories(
        &self,
        id: Uuid,
    ) -> Result<Option<PostWithCategories>, RepoError> {
        // One joined SELECT, so the category set comes from a single snapshot.
        let rows = PostEntity::find_by_id(id)
            .find_with_related(CategoryEntity)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .next()
            .map(|(model, categories)| joined(model, categories)))
    }

    async fn list_with_categories(&self) -> Result<Vec<PostWithCategories>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .find_with_related(CategoryEntity)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(model, categories)| joined(model, categories))
            .collect())
    }

    async fn create_with_categories(
        &self,
        post: Post,
        categories: &BTreeSet<Uuid>,
    ) -> Result<PostWithCategories, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = Self::create_in(&txn, post, categories).await;
        finish(txn, result).await
    }

    async fn update_with_categories(
        &self,
        id: Uuid,
        changes: PostChanges,
        categories: &BTreeSet<Uuid>,
    ) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = Self::update_in(&txn, id, changes, categories).await;
        finish(txn, result).await
    }

    async fn replace_categories(
        &self,
        id: Uuid,
        categories: &BTreeSet<Uuid>,
    ) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = match lock_post(&txn, id).await {
            Ok(_) => replace_links(&txn, id, categories).await,
            Err(err) => Err(err),
        };
        finish(txn, result).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = Self::delete_in(&txn, id).await;
        finish(txn, result).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::CreatedAt)
            .order_by_asc(category::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_existing(&self, ids: &BTreeSet<Uuid>) -> Result<BTreeSet<Uuid>, RepoError> {
        if ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let found = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(found.into_iter().map(|model| model.id).collect())
    }

    async fn delete_unused(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let result = Self::delete_unused_in(&txn, id).await;
        finish(txn, result).await
    }
}
