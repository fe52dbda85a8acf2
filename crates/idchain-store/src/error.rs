//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A chain already exists for this owner.
    #[error("chain already exists for owner {0}")]
    AlreadyExists(String),

    /// No chain is stored for this owner.
    #[error("chain not found: {0}")]
    NotFound(String),

    /// The chain cannot be stored as given (e.g. empty owner id).
    #[error("invalid chain: {0}")]
    InvalidInput(String),

    /// The store document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading, writing or renaming the store document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
