//! Data model: events, block links and the chain aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::crypto::{DecodeError, PublicKey};
use crate::error::ChainError;

/// `prev_hash` of the first block in every chain.
pub const GENESIS_PREV_HASH: &str = "GENESIS";

/// Category of identity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    IdentityAssertion,
    Login,
    Verification,
    Authorization,
    Recovery,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::IdentityAssertion,
        EventType::Login,
        EventType::Verification,
        EventType::Authorization,
        EventType::Recovery,
    ];

    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::IdentityAssertion => "identity_assertion",
            EventType::Login => "login",
            EventType::Verification => "verification",
            EventType::Authorization => "authorization",
            EventType::Recovery => "recovery",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ChainError::InvalidInput("event type is required".into()));
        }
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ChainError::InvalidInput(format!("unknown event type: {s}")))
    }
}

/// One unit of user activity.
///
/// Events are not stored; only their hash is bound into a [`BlockLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEvent {
    /// Opaque identifier. Empty means "assign one on append".
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EventType,

    /// Defaulted to the append time when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub actor_id: String,

    /// Caller-supplied risk tag; carried, never interpreted here.
    #[serde(default)]
    pub risk: String,

    /// `None` and an empty map hash differently (`null` vs `{}`).
    #[serde(default)]
    pub payload: Option<BTreeMap<String, String>>,
}

impl IdentityEvent {
    pub fn new(kind: EventType, actor_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            timestamp: None,
            actor_id: actor_id.into(),
            risk: String::new(),
            payload: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = risk.into();
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A signed, hash-bound wrapper around one event.
///
/// Fields hold their wire encodings (hex hashes, base64 key and signature)
/// so that verification can report malformed values per block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLink {
    pub index: u64,
    pub prev_hash: String,
    pub event_hash: String,
    pub hash: String,
    pub signature: String,
    pub signer_public_key: String,
}

/// A per-owner, append-only chain of signed block links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityChain {
    pub owner_id: String,
    /// Base64 root key, kept as stored so one malformed chain does not
    /// prevent loading the others. Decode with [`IdentityChain::root_key`].
    pub root_public_key: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blocks: Vec<BlockLink>,
}

impl IdentityChain {
    /// Decode the root public key.
    pub fn root_key(&self) -> Result<PublicKey, DecodeError> {
        PublicKey::from_base64(&self.root_public_key)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recent block, if any.
    pub fn head(&self) -> Option<&BlockLink> {
        self.blocks.last()
    }
}

// Older documents persist an empty chain as `"blocks": null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_event_type_parse() {
        assert_eq!("login".parse::<EventType>().unwrap(), EventType::Login);
        assert_eq!(
            "identity_assertion".parse::<EventType>().unwrap(),
            EventType::IdentityAssertion
        );
        assert!(matches!(
            "".parse::<EventType>(),
            Err(ChainError::InvalidInput(_))
        ));
        assert!(matches!(
            "logout".parse::<EventType>(),
            Err(ChainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_event_type_serde_matches_as_str() {
        for kind in EventType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_event_deserialize_defaults() {
        let event: IdentityEvent = serde_json::from_str(r#"{"type":"recovery"}"#).unwrap();
        assert_eq!(event.kind, EventType::Recovery);
        assert!(event.id.is_empty());
        assert!(event.timestamp.is_none());
        assert!(event.actor_id.is_empty());
        assert!(event.payload.is_none());
    }

    #[test]
    fn test_chain_accepts_null_blocks() {
        let pk = Keypair::from_seed(&[1u8; 32]).public_key();
        let json = format!(
            r#"{{"owner_id":"user:a","root_public_key":"{}","created_at":"2025-01-14T12:00:00Z","blocks":null}}"#,
            pk.to_base64()
        );
        let chain: IdentityChain = serde_json::from_str(&json).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.root_key().unwrap(), pk);
    }

    #[test]
    fn test_payload_absent_null_and_empty() {
        let absent: IdentityEvent = serde_json::from_str(r#"{"type":"login"}"#).unwrap();
        let null: IdentityEvent =
            serde_json::from_str(r#"{"type":"login","payload":null}"#).unwrap();
        let empty: IdentityEvent = serde_json::from_str(r#"{"type":"login","payload":{}}"#).unwrap();
        assert_eq!(absent.payload, None);
        assert_eq!(null.payload, None);
        assert_eq!(empty.payload, Some(BTreeMap::new()));

        let built = IdentityEvent::new(EventType::Login, "u").with_payload("k", "v");
        assert_eq!(built.payload.unwrap().len(), 1);
    }

    #[test]
    fn test_chain_loads_with_malformed_root_key() {
        let json = r#"{"owner_id":"user:a","root_public_key":"AAAA","created_at":"2025-01-14T12:00:00Z","blocks":[]}"#;
        let chain: IdentityChain = serde_json::from_str(json).unwrap();
        assert_eq!(chain.root_public_key, "AAAA");
        assert!(matches!(
            chain.root_key(),
            Err(DecodeError::Length { expected: 32, got: 3 })
        ));
    }

    #[test]
    fn test_chain_wire_field_names() {
        let chain = IdentityChain {
            owner_id: "user:a".into(),
            root_public_key: Keypair::from_seed(&[1u8; 32]).public_key().to_base64(),
            created_at: "2025-01-14T12:00:00Z".parse().unwrap(),
            blocks: vec![],
        };
        let value = serde_json::to_value(&chain).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["owner_id", "root_public_key", "created_at", "blocks"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["created_at"], "2025-01-14T12:00:00Z");
    }
}
