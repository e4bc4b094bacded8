//! # Folio Core
//!
//! The domain layer of the Folio content backend: posts, categories and the
//! rules that keep their associations consistent.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError, ValidationError};
