//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// `{ "error": ..., "status": ... }`.
///
/// `error` is shown to operators as-is, so it never carries internal detail
/// for server-side failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,

    /// The HTTP status code.
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    // Common error constructors
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(400, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(404, error)
    }

    pub fn conflict(error: impl Into<String>) -> Self {
        Self::new(409, error)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal server error")
    }
}
