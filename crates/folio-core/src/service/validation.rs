//! Validation gate - every check that must pass before a write is attempted.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::{DomainError, ValidationError};
use crate::ports::CategoryRepository;

/// A deduplicated category set whose members all resolved to stored categories.
///
/// Only [`validate_category_set`] can build one, so services cannot hand an
/// unchecked set to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedCategories(BTreeSet<Uuid>);

impl ValidatedCategories {
    pub fn as_set(&self) -> &BTreeSet<Uuid> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve `ids` against the category store in a single batch lookup.
///
/// All-or-nothing: any unresolved id fails the whole set and the error names
/// every one of them.
pub async fn validate_category_set(
    categories: &dyn CategoryRepository,
    ids: &[Uuid],
) -> Result<ValidatedCategories, DomainError> {
    validate_submitted_categories(categories, ids, &[]).await
}

/// [`validate_category_set`] for identifiers as submitted by a client.
///
/// `malformed` holds the submitted identifiers that are not UUIDs. They can
/// never resolve, and they are reported in the same error as the well-formed
/// ids the store does not know.
pub async fn validate_submitted_categories(
    categories: &dyn CategoryRepository,
    ids: &[Uuid],
    malformed: &[String],
) -> Result<ValidatedCategories, DomainError> {
    let requested: BTreeSet<Uuid> = ids.iter().copied().collect();
    let existing = if requested.is_empty() {
        BTreeSet::new()
    } else {
        categories
            .find_existing(&requested)
            .await
            .map_err(DomainError::Repository)?
    };

    let malformed: BTreeSet<&str> = malformed.iter().map(String::as_str).collect();
    let unresolved: Vec<String> = malformed
        .iter()
        .map(|raw| raw.to_string())
        .chain(requested.difference(&existing).map(Uuid::to_string))
        .collect();
    if !unresolved.is_empty() {
        tracing::debug!(
            requested = requested.len() + malformed.len(),
            unknown = unresolved.len(),
            "Rejecting category set with unresolved ids"
        );
        return Err(ValidationError::unknown_categories(unresolved).into());
    }

    Ok(ValidatedCategories(requested))
}

/// Trim `value`, rejecting it with `error` when nothing is left.
pub fn require_text(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_string())
}
