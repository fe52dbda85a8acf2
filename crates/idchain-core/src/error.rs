//! Error types for the identity chain core.

use thiserror::Error;

/// Errors returned when building or extending a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Missing or malformed caller input (owner id, event fields, key encoding).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing signer key, or a signer that is not the chain's root key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Diagnostic produced by chain verification.
///
/// Every variant carries the index of the first block that failed and a
/// human-readable reason. Verification stops at that block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("block {index}: linkage error: {reason}")]
    Linkage { index: u64, reason: String },

    #[error("block {index}: integrity error: {reason}")]
    Integrity { index: u64, reason: String },

    #[error("block {index}: encoding error: {reason}")]
    Encoding { index: u64, reason: String },

    #[error("block {index}: signature error: {reason}")]
    Signature { index: u64, reason: String },
}

impl VerifyError {
    /// Position of the offending block.
    pub fn index(&self) -> u64 {
        match self {
            VerifyError::Linkage { index, .. }
            | VerifyError::Integrity { index, .. }
            | VerifyError::Encoding { index, .. }
            | VerifyError::Signature { index, .. } => *index,
        }
    }

    /// The reason text without the block prefix.
    pub fn reason(&self) -> &str {
        match self {
            VerifyError::Linkage { reason, .. }
            | VerifyError::Integrity { reason, .. }
            | VerifyError::Encoding { reason, .. }
            | VerifyError::Signature { reason, .. } => reason,
        }
    }
}

/// Result type for chain construction operations.
pub type Result<T> = std::result::Result<T, ChainError>;
