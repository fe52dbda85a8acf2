//! IdentityService: the collaborator-facing API over a chain store.
//!
//! Each operation composes the policy gate, the chain engine and the store
//! in a fixed order, so callers get the same error for the same fault no
//! matter which front end they use.

use serde::Serialize;

use idchain_auth::{validate_root_action, AuthContext};
use idchain_core::{engine, ChainError, IdentityChain, IdentityEvent, Keypair, PublicKey};
use idchain_store::{ChainStore, FileStore};

use crate::config::Config;
use crate::error::{ErrorKind, Result};

/// Result of [`IdentityService::create_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedChain {
    pub chain: IdentityChain,

    /// Base64 of the 64-byte `seed || public` root key, present only when
    /// the service generated the key. It is not retained anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_private_key: Option<String>,
}

/// Outcome of verifying a stored chain.
///
/// A broken chain is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u64>,
}

impl VerificationReport {
    fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            kind: None,
            block_index: None,
        }
    }
}

/// Identity chain operations over a store `S`.
pub struct IdentityService<S: ChainStore> {
    store: S,
}

impl IdentityService<FileStore> {
    /// Open the file store named by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(FileStore::open_with(config.store_config())?))
    }
}

impl<S: ChainStore> IdentityService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create an empty chain for `owner_id`.
    ///
    /// With no `root_public_key` a fresh keypair is generated and its
    /// private half returned once in the result.
    pub fn create_chain(
        &self,
        owner_id: &str,
        root_public_key: Option<&str>,
    ) -> Result<CreatedChain> {
        if owner_id.is_empty() {
            return Err(ChainError::InvalidInput("owner_id is required".into()).into());
        }

        let supplied = root_public_key.map(str::trim).filter(|k| !k.is_empty());
        let (public_key, root_private_key) = match supplied {
            Some(encoded) => {
                let key = PublicKey::from_base64(encoded).map_err(|e| {
                    ChainError::InvalidInput(format!("invalid root_public_key: {e}"))
                })?;
                (key, None)
            }
            None => {
                let keypair = Keypair::generate();
                (keypair.public_key(), Some(keypair.to_keypair_base64()))
            }
        };

        let chain = engine::create_chain(owner_id, public_key)?;
        self.store.create(&chain)?;

        tracing::info!(
            owner_id,
            root_public_key = %chain.root_public_key,
            generated_key = root_private_key.is_some(),
            "created identity chain"
        );
        Ok(CreatedChain {
            chain,
            root_private_key,
        })
    }

    pub fn get_chain(&self, owner_id: &str) -> Result<IdentityChain> {
        Ok(self.store.get(owner_id)?)
    }

    pub fn list_chains(&self) -> Result<Vec<IdentityChain>> {
        Ok(self.store.list()?)
    }

    /// Append `event` to the chain of `owner_id`, signed with
    /// `signer_private_key` (base64 seed or keypair).
    ///
    /// The authentication policy is evaluated before anything else. An
    /// empty `actor_id` defaults to the owner.
    pub fn append_event(
        &self,
        owner_id: &str,
        mut event: IdentityEvent,
        signer_private_key: &str,
        auth: &AuthContext,
    ) -> Result<IdentityChain> {
        if let Err(e) = validate_root_action(auth) {
            tracing::warn!(owner_id, risk = %auth.risk, error = %e, "root action rejected");
            return Err(e.into());
        }

        let signer = Keypair::from_base64(signer_private_key)?;
        let chain = self.store.get(owner_id)?;

        if event.actor_id.is_empty() {
            event.actor_id = owner_id.to_string();
        }

        let next = engine::append_event(&chain, event, &signer).map_err(|e| {
            tracing::warn!(owner_id, error = %e, "append rejected");
            e
        })?;
        self.store.update(&next)?;
        Ok(next)
    }

    /// Verify the stored chain of `owner_id`.
    pub fn verify_chain(&self, owner_id: &str) -> Result<VerificationReport> {
        let chain = self.store.get(owner_id)?;

        match engine::verify_chain(&chain) {
            Ok(()) => Ok(VerificationReport::valid()),
            Err(e) => {
                tracing::warn!(owner_id, index = e.index(), error = %e, "chain failed verification");
                Ok(VerificationReport {
                    valid: false,
                    kind: Some(ErrorKind::from(&e)),
                    block_index: Some(e.index()),
                    error: Some(e.to_string()),
                })
            }
        }
    }
}
