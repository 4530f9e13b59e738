use std::collections::BTreeMap;

use crate::types::{DbId, Timestamp, Version};

/// Field name to human-readable message, one entry per offending field.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more declared field constraints were violated.
    #[error("Validation failed for {} field(s)", .0.len())]
    FieldValidation(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A write carried a stale version number.
    #[error(
        "{entity} with id {id} was modified concurrently \
         (expected version {expected_version}, current version {current_version})"
    )]
    OptimisticLock {
        entity: &'static str,
        id: DbId,
        expected_version: Version,
        current_version: Version,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
        reset_at: Timestamp,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        CoreError::FieldValidation(errors)
    }
}
