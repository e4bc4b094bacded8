//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::ports::{CategoryRepository, PostRepository};
use folio_core::service::{CategoryService, PostService, QueryService};
use folio_infra::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
use folio_infra::{PostgresCategoryRepository, PostgresPostRepository, database};

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub categories: CategoryService,
    pub storage: Storage,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, page_size: usize) -> Self {
        let query = QueryService::new(page_size);

        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match database::connect(config).await {
                    Ok(conn) => {
                        let conn = Arc::new(conn);
                        let posts: Arc<dyn PostRepository> =
                            Arc::new(PostgresPostRepository::shared(conn.clone()));
                        let categories: Arc<dyn CategoryRepository> =
                            Arc::new(PostgresCategoryRepository::shared(conn));
                        tracing::info!("Application state initialized (postgres)");
                        return Self::from_repositories(posts, categories, query, Storage::Postgres);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        tracing::info!("Application state initialized (memory)");
        Self::in_memory(query)
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(query: QueryService) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let posts: Arc<dyn PostRepository> = store.clone();
        let categories: Arc<dyn CategoryRepository> = store;
        Self::from_repositories(posts, categories, query, Storage::Memory)
    }

    pub fn from_repositories(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        query: QueryService,
        storage: Storage,
    ) -> Self {
        Self {
            posts: PostService::new(posts, categories.clone(), query),
            categories: CategoryService::new(categories, query),
            storage,
        }
    }
}
