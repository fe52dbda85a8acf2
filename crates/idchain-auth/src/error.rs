//! Error types for the authorization policy.

use thiserror::Error;

/// Errors raised when a root action is not sufficiently authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Required authentication factors were not presented.
    #[error("insufficient factors: {0}")]
    InsufficientFactors(String),
}

/// Result type for policy checks.
pub type Result<T> = std::result::Result<T, AuthError>;
