//! Error types for the service layer.

use serde::Serialize;
use thiserror::Error;

use idchain_auth::AuthError;
use idchain_core::{ChainError, VerifyError};
use idchain_store::StoreError;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected by the chain engine or by input parsing.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Root action rejected by the authentication policy.
    #[error("unauthorized: {0}")]
    Auth(#[from] AuthError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of failures, stable across crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    Integrity,
    Linkage,
    Signature,
    Encoding,
    AlreadyExists,
    NotFound,
    IoFailure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Chain(ChainError::InvalidInput(_)) => ErrorKind::InvalidInput,
            Error::Chain(ChainError::Unauthorized(_)) => ErrorKind::Unauthorized,
            Error::Auth(_) => ErrorKind::Unauthorized,
            Error::Store(e) => match e {
                StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
                StoreError::Serialization(_) | StoreError::Io(_) | StoreError::LockPoisoned => {
                    ErrorKind::IoFailure
                }
            },
        }
    }
}

impl From<&VerifyError> for ErrorKind {
    fn from(e: &VerifyError) -> Self {
        match e {
            VerifyError::Linkage { .. } => ErrorKind::Linkage,
            VerifyError::Integrity { .. } => ErrorKind::Integrity,
            VerifyError::Encoding { .. } => ErrorKind::Encoding,
            VerifyError::Signature { .. } => ErrorKind::Signature,
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let cases: Vec<(Error, ErrorKind)> = vec![
            (ChainError::InvalidInput("x".into()).into(), ErrorKind::InvalidInput),
            (ChainError::Unauthorized("x".into()).into(), ErrorKind::Unauthorized),
            (AuthError::InsufficientFactors("x".into()).into(), ErrorKind::Unauthorized),
            (StoreError::AlreadyExists("a".into()).into(), ErrorKind::AlreadyExists),
            (StoreError::NotFound("a".into()).into(), ErrorKind::NotFound),
            (StoreError::LockPoisoned.into(), ErrorKind::IoFailure),
            (
                StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into(),
                ErrorKind::IoFailure,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_verify_kind_mapping() {
        let linkage = VerifyError::Linkage {
            index: 3,
            reason: "prev hash mismatch".into(),
        };
        assert_eq!(ErrorKind::from(&linkage), ErrorKind::Linkage);
        assert_eq!(
            serde_json::to_value(ErrorKind::IoFailure).unwrap(),
            "io_failure"
        );
    }
}
