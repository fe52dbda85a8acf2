//! ChainStore trait: the persistence contract for identity chains.
//!
//! Implementations are keyed by owner id and exchange owned copies of
//! chains in both directions, so callers never share state with the store.

use std::sync::Arc;

use idchain_core::IdentityChain;

use crate::error::Result;

/// Persistence for identity chains, one per owner.
///
/// # Contract
///
/// - `create` fails with `AlreadyExists` if the owner already has a chain.
/// - `get` and `update` fail with `NotFound` for unknown owners.
/// - `update` replaces the stored chain wholesale. There is no concurrency
///   token: concurrent read-modify-write cycles on one owner lose updates
///   unless the caller serializes them.
/// - `list` order is unspecified.
/// - A failed commit leaves the store at its last committed state.
pub trait ChainStore: Send + Sync {
    /// Insert a new chain.
    fn create(&self, chain: &IdentityChain) -> Result<()>;

    /// Fetch the chain for `owner_id`.
    fn get(&self, owner_id: &str) -> Result<IdentityChain>;

    /// Replace the stored chain for `chain.owner_id`.
    fn update(&self, chain: &IdentityChain) -> Result<()>;

    /// Every stored chain.
    fn list(&self) -> Result<Vec<IdentityChain>>;
}

impl<S: ChainStore + ?Sized> ChainStore for Arc<S> {
    fn create(&self, chain: &IdentityChain) -> Result<()> {
        (**self).create(chain)
    }

    fn get(&self, owner_id: &str) -> Result<IdentityChain> {
        (**self).get(owner_id)
    }

    fn update(&self, chain: &IdentityChain) -> Result<()> {
        (**self).update(chain)
    }

    fn list(&self) -> Result<Vec<IdentityChain>> {
        (**self).list()
    }
}
