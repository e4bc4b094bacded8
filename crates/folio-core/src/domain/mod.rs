//! Domain entities - the core business objects.

mod category;
mod post;

pub use category::{Category, CategoryRef};
pub use post::{Post, PostChanges, PostWithCategories};
