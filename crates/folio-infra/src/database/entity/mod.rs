//! SeaORM entities for the content tables.

pub mod category;
pub mod post;
pub mod post_category;
