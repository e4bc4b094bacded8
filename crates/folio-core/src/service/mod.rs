//! Services - use-cases composed from the ports.

mod category_service;
mod post_service;
pub mod query;
pub mod validation;

pub use category_service::CategoryService;
pub use post_service::{PostInput, PostService};
pub use query::{ListQuery, Listable, Page, QueryService, SortKey, ViewMode};
pub use validation::{ValidatedCategories, validate_category_set, validate_submitted_categories};
