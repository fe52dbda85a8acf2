//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use idchain_auth::{AuthContext, RiskLevel};
use idchain_core::{
    append_event, create_chain, EventType, IdentityChain, IdentityEvent, Keypair, PublicKey,
};
use idchain_store::{ChainStore, MemoryStore};

/// A test fixture: one owner, their root keypair and a memory store.
pub struct TestFixture {
    pub owner_id: String,
    pub keypair: Keypair,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::for_owner("user:test", Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::for_owner("user:test", Keypair::from_seed(&seed))
    }

    pub fn for_owner(owner_id: &str, keypair: Keypair) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            keypair,
            store: MemoryStore::new(),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Base64 of the private key, as a caller would present it.
    pub fn private_key_base64(&self) -> String {
        self.keypair.to_keypair_base64()
    }

    /// An empty chain for this owner. Not stored.
    pub fn empty_chain(&self) -> IdentityChain {
        create_chain(&self.owner_id, self.public_key()).expect("owner id is non-empty")
    }

    /// An event by this owner with a fixed payload.
    pub fn make_event(&self, kind: EventType, n: usize) -> IdentityEvent {
        IdentityEvent::new(kind, self.owner_id.as_str())
            .with_risk("normal")
            .with_payload("seq", n.to_string())
    }

    /// A chain of `n` signed events, cycling through every event type.
    pub fn chain_with(&self, n: usize) -> IdentityChain {
        (0..n).fold(self.empty_chain(), |chain, i| {
            let kind = EventType::ALL[i % EventType::ALL.len()];
            append_event(&chain, self.make_event(kind, i), &self.keypair)
                .expect("fixture signer is the root key")
        })
    }

    /// Put a chain of `n` events into the fixture store and return it.
    pub fn store_chain(&self, n: usize) -> IdentityChain {
        let chain = self.chain_with(n);
        self.store.create(&chain).expect("fixture owner is fresh");
        chain
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Every factor present at the given tier.
pub fn full_auth(risk: RiskLevel) -> AuthContext {
    AuthContext {
        long_phrase: true,
        email_otp: true,
        totp: true,
        hardware_key: true,
        risk,
    }
}

/// The minimum accepted context for a normal-risk action.
pub fn normal_auth() -> AuthContext {
    AuthContext {
        long_phrase: true,
        email_otp: true,
        totp: true,
        hardware_key: false,
        risk: RiskLevel::Normal,
    }
}

/// Fixtures for `n` distinct owners with deterministic keys.
pub fn multi_owner_fixtures(n: usize) -> Vec<TestFixture> {
    (0..n)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
            TestFixture::for_owner(&format!("user:{i}"), Keypair::from_seed(&seed))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use idchain_core::verify_chain;

    #[test]
    fn test_fixture_chain_verifies() {
        let fixture = TestFixture::with_seed([7; 32]);
        let chain = fixture.chain_with(7);
        assert_eq!(chain.len(), 7);
        assert!(verify_chain(&chain).is_ok());
    }

    #[test]
    fn test_store_chain() {
        let fixture = TestFixture::new();
        let chain = fixture.store_chain(2);
        assert_eq!(fixture.store.get(&fixture.owner_id).unwrap(), chain);
    }

    #[test]
    fn test_multi_owner_keys_distinct() {
        let fixtures = multi_owner_fixtures(3);
        assert_ne!(fixtures[0].public_key(), fixtures[1].public_key());
        assert_ne!(fixtures[1].owner_id, fixtures[2].owner_id);
    }

    #[test]
    fn test_auth_helpers_pass_policy() {
        assert!(idchain_auth::validate_root_action(&normal_auth()).is_ok());
        assert!(idchain_auth::validate_root_action(&full_auth(RiskLevel::High)).is_ok());
    }
}
