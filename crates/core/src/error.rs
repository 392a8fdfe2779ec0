//! Domain error model.

use thiserror::Error;

/// Result type used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are the failures a command handler is allowed to surface to its
/// caller. Transport mapping (HTTP status codes) happens at the edge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness constraint on a natural key was violated.
    #[error("{0}")]
    DuplicateKey(String),

    /// A requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The underlying store refused a commit (e.g. a concurrent writer won).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Credentials did not match a known user.
    #[error("Wrong email or password")]
    InvalidCredentials,

    /// An infrastructure failure that is not the caller's fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller can fix the request and retry (400/404 class).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::Conflict(_) | DomainError::Internal(_))
    }
}
