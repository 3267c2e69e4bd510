//! Core error model.

use thiserror::Error;

/// Result type used across the core value types.
pub type CoreResult<T> = Result<T, CoreError>;

/// Deterministic validation failures of core value types.
///
/// Remote-call and lifecycle failures belong to the client and jobs crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value failed validation (e.g. inverted time range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty run id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
