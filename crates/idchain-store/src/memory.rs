//! In-memory store implementation.
//!
//! Same semantics as the file store, without persistence. Useful for
//! testing and for embedding the service where durability is handled
//! elsewhere.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use idchain_core::IdentityChain;

use crate::error::{Result, StoreError};
use crate::traits::ChainStore;

/// In-memory chain store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chains: RwLock<BTreeMap<String, IdentityChain>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, IdentityChain>>> {
        self.chains.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, IdentityChain>>> {
        self.chains.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ChainStore for MemoryStore {
    fn create(&self, chain: &IdentityChain) -> Result<()> {
        if chain.owner_id.is_empty() {
            return Err(StoreError::InvalidInput("owner_id is required".into()));
        }
        let mut chains = self.write()?;
        if chains.contains_key(&chain.owner_id) {
            return Err(StoreError::AlreadyExists(chain.owner_id.clone()));
        }
        chains.insert(chain.owner_id.clone(), chain.clone());
        Ok(())
    }

    fn get(&self, owner_id: &str) -> Result<IdentityChain> {
        self.read()?
            .get(owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(owner_id.to_string()))
    }

    fn update(&self, chain: &IdentityChain) -> Result<()> {
        let mut chains = self.write()?;
        match chains.get_mut(&chain.owner_id) {
            Some(slot) => {
                *slot = chain.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(chain.owner_id.clone())),
        }
    }

    fn list(&self) -> Result<Vec<IdentityChain>> {
        Ok(self.read()?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idchain_core::{create_chain, Keypair};

    fn chain(owner: &str, seed: u8) -> IdentityChain {
        create_chain(owner, Keypair::from_seed(&[seed; 32]).public_key()).unwrap()
    }

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert!(store.list().unwrap().is_empty());

        let alice = chain("user:alice", 1);
        store.create(&alice).unwrap();
        assert_eq!(store.get("user:alice").unwrap(), alice);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_create_duplicate_keeps_first() {
        let store = MemoryStore::new();
        let first = chain("user:alice", 1);
        store.create(&first).unwrap();

        let err = store.create(&chain("user:alice", 2)).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(owner) if owner == "user:alice"));
        assert_eq!(store.get("user:alice").unwrap(), first);
    }

    #[test]
    fn test_missing_owner() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("nobody"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update(&chain("nobody", 1)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_owner_rejected() {
        let store = MemoryStore::new();
        let mut nameless = chain("user:alice", 1);
        nameless.owner_id.clear();
        assert!(matches!(
            store.create(&nameless),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces() {
        let store = MemoryStore::new();
        let original = chain("user:alice", 1);
        store.create(&original).unwrap();

        let mut replaced = original.clone();
        replaced.created_at = "2030-01-01T00:00:00Z".parse().unwrap();
        store.update(&replaced).unwrap();
        assert_eq!(store.get("user:alice").unwrap(), replaced);
    }

    #[test]
    fn test_returned_chain_is_a_copy() {
        let store = MemoryStore::new();
        store.create(&chain("user:alice", 1)).unwrap();

        let mut copy = store.get("user:alice").unwrap();
        copy.owner_id = "mutated".into();
        assert_eq!(store.get("user:alice").unwrap().owner_id, "user:alice");
    }
}
