//! Golden test vectors for deterministic verification.
//!
//! Four events appended in order to one chain under the seed `[0x42; 32]`.
//! Ed25519 signing is deterministic, so every output below is fixed. Any
//! change to canonical encoding, link hashing or signing shows up here.

use chrono::{DateTime, Utc};

use idchain_core::{
    append_event_at, canonical_event_bytes, create_chain, event_hash, EventType, IdentityChain,
    IdentityEvent, Keypair,
};

/// Seed of the signing key for every vector.
pub const GOLDEN_SEED: [u8; 32] = [0x42; 32];

/// Owner of the golden chain.
pub const GOLDEN_OWNER: &str = "user:alice";

/// Base64 public key derived from [`GOLDEN_SEED`].
pub const GOLDEN_PUBLIC_KEY: &str = "IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=";

/// Base64 of the 64-byte `seed || public` form of the golden key.
pub const GOLDEN_PRIVATE_KEY: &str =
    "QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkIhUvjRm3kdJEUyQuFfLqtst8/6e2pe0wCXlg4GmIHbEg==";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Position in the golden chain.
    pub index: u64,
    pub id: &'static str,
    pub kind: EventType,
    /// RFC3339 timestamp.
    pub timestamp: &'static str,
    pub actor_id: &'static str,
    pub risk: &'static str,
    /// `None` is an absent payload, encoded as `null`.
    pub payload: Option<&'static [(&'static str, &'static str)]>,
    /// Expected canonical event encoding.
    pub expected_canonical: &'static str,
    /// Expected event hash (hex).
    pub expected_event_hash: &'static str,
    /// Expected link hash (hex).
    pub expected_hash: &'static str,
    /// Expected signature (base64).
    pub expected_signature: &'static str,
}

impl GoldenVector {
    /// The event this vector commits to.
    pub fn event(&self) -> IdentityEvent {
        let mut event = IdentityEvent::new(self.kind, self.actor_id)
            .with_id(self.id)
            .with_risk(self.risk);
        event.timestamp = self.timestamp.parse::<DateTime<Utc>>().ok();
        event.payload = self.payload.map(|entries| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        });
        event
    }
}

/// Get all golden test vectors, in chain order.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "login with unsorted payload",
            index: 0,
            id: "evt-0001",
            kind: EventType::Login,
            timestamp: "2025-01-14T12:00:00Z",
            actor_id: "user:alice",
            risk: "normal",
            payload: Some(&[("ip", "127.0.0.1"), ("device", "laptop")]),
            expected_canonical: r#"{"id":"evt-0001","type":"login","timestamp":"2025-01-14T12:00:00Z","actor_id":"user:alice","risk":"normal","payload":{"device":"laptop","ip":"127.0.0.1"}}"#,
            expected_event_hash: "4835607e6d5dbbccd38f4613882cf33788003d765954245d24284c737c909e67",
            expected_hash: "8e78f42dfb9d6c1f974c7412b52ad806d09761fc5e5e8b4e9507a08db83b2a4e",
            expected_signature: "+Mlx/qKArlbS7mB1RcqUtW66lzRcNc1N5U/tkHEjrMvzVWPyl45lczu1k5kC07g597ckqOTe0JI/P26/7K/oDw==",
        },
        GoldenVector {
            name: "fractional seconds and html-escaped payload",
            index: 1,
            id: "evt-0002",
            kind: EventType::Verification,
            timestamp: "2025-01-14T12:00:00.5Z",
            actor_id: "user:alice",
            risk: "high",
            payload: Some(&[("note", "<a&b>")]),
            expected_canonical: r#"{"id":"evt-0002","type":"verification","timestamp":"2025-01-14T12:00:00.5Z","actor_id":"user:alice","risk":"high","payload":{"note":"\u003ca\u0026b\u003e"}}"#,
            expected_event_hash: "dfdca68b6d5e9eef51dab80533aa6b7c3658c55158b2fe477f91eceaebf1b0a4",
            expected_hash: "1c201836b84f0c2eb03570721470d4231cfc253985fa37a7832dc0d7eb9d803b",
            expected_signature: "rEWQrBc8DVUfMT8BoNL0iwzWclN5KB7jmZ0LTSs+FGI629C/Oz5FktY1Jjp7h1MOXfB0GAn2c1B+VdKUk2UEBg==",
        },
        GoldenVector {
            name: "nanosecond timestamp, foreign actor, empty payload",
            index: 2,
            id: "evt-0003",
            kind: EventType::IdentityAssertion,
            timestamp: "2025-01-15T08:30:00.123456789Z",
            actor_id: "issuer:gov",
            risk: "",
            payload: Some(&[]),
            expected_canonical: r#"{"id":"evt-0003","type":"identity_assertion","timestamp":"2025-01-15T08:30:00.123456789Z","actor_id":"issuer:gov","risk":"","payload":{}}"#,
            expected_event_hash: "843145e2faf6eca0fb913713f097a718cb41d16220f4124b97f265b8810ace23",
            expected_hash: "03c02fe6047f103dec07e64e7c7e8cea8f948668e712ca9ed3e09a8321787a98",
            expected_signature: "uBnK935UZL6/NBzGJ4nV9HJPwWNPsYKS+8ajpaIJ31hpgZ4kWd6SFMEmlI5b5A8wtpGXaOuiR9z/DkHErGo/DA==",
        },
        GoldenVector {
            name: "absent payload",
            index: 3,
            id: "evt-0004",
            kind: EventType::Recovery,
            timestamp: "2025-02-01T00:00:00Z",
            actor_id: "user:alice",
            risk: "high",
            payload: None,
            expected_canonical: r#"{"id":"evt-0004","type":"recovery","timestamp":"2025-02-01T00:00:00Z","actor_id":"user:alice","risk":"high","payload":null}"#,
            expected_event_hash: "9843d823d723c527bffb0be4ca94e0e8fe020b6eefb003279f03a9de96ada206",
            expected_hash: "7d30f0f45756c1f57378cf10dede2f130c5f6aabfe9fe3afa864eff9065b87cf",
            expected_signature: "xFAVNuCqpGDoxFOy/8gNEjFhMkpqA0GV060RIern2VcjqNwtv9Up3esreEfg5aCxNiLvHnLw07pxgZio4j3UCg==",
        },
    ]
}

/// The golden keypair.
pub fn golden_keypair() -> Keypair {
    Keypair::from_seed(&GOLDEN_SEED)
}

/// Build the golden chain by appending every vector in order.
///
/// # Panics
///
/// If the engine rejects a vector event.
pub fn golden_chain() -> IdentityChain {
    let keypair = golden_keypair();
    let chain = create_chain(GOLDEN_OWNER, keypair.public_key()).expect("owner is non-empty");
    all_vectors().iter().fold(chain, |chain, vector| {
        append_event_at(&chain, vector.event(), &keypair, Utc::now())
            .expect("golden events are valid")
    })
}

/// Check every vector against the current implementation.
///
/// Returns a description of the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    let keypair = golden_keypair();
    if keypair.public_key().to_base64() != GOLDEN_PUBLIC_KEY {
        return Err("golden public key mismatch".into());
    }
    if keypair.to_keypair_base64() != GOLDEN_PRIVATE_KEY {
        return Err("golden private key mismatch".into());
    }

    let chain = golden_chain();
    for vector in all_vectors() {
        let event = vector.event();
        let canonical = String::from_utf8(canonical_event_bytes(&event))
            .map_err(|e| format!("{}: canonical bytes are not UTF-8: {e}", vector.name))?;
        if canonical != vector.expected_canonical {
            return Err(format!(
                "{}: canonical mismatch\n  expected: {}\n  got:      {}",
                vector.name, vector.expected_canonical, canonical
            ));
        }
        if event_hash(&event).to_hex() != vector.expected_event_hash {
            return Err(format!("{}: event hash mismatch", vector.name));
        }

        let block = chain
            .blocks
            .get(vector.index as usize)
            .ok_or_else(|| format!("{}: missing block {}", vector.name, vector.index))?;
        if block.event_hash != vector.expected_event_hash {
            return Err(format!("{}: block event hash mismatch", vector.name));
        }
        if block.hash != vector.expected_hash {
            return Err(format!(
                "{}: link hash mismatch\n  expected: {}\n  got:      {}",
                vector.name, vector.expected_hash, block.hash
            ));
        }
        if block.signature != vector.expected_signature {
            return Err(format!("{}: signature mismatch", vector.name));
        }
        if block.signer_public_key != GOLDEN_PUBLIC_KEY {
            return Err(format!("{}: signer public key mismatch", vector.name));
        }
    }
    Ok(())
}
