//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use idchain_auth::{AuthContext, RiskLevel};
use idchain_core::{EventType, IdentityEvent, Keypair, PublicKey};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate an EventType.
pub fn event_type() -> impl Strategy<Value = EventType> {
    prop::sample::select(EventType::ALL.to_vec())
}

/// Text that exercises canonical escaping.
pub fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:._ <>&\"\\\\/\n\té\u{2028}-]{0,16}"
}

/// A non-empty actor id.
pub fn actor_id() -> impl Strategy<Value = String> {
    "[a-z]{1,8}:[a-z0-9]{1,12}"
}

/// Generate a timestamp between 1970 and 2100 with arbitrary nanoseconds.
pub fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000).prop_filter_map(
        "representable timestamp",
        |(secs, nanos)| DateTime::from_timestamp(secs, nanos),
    )
}

/// Generate a payload: absent, empty or populated.
pub fn payload() -> impl Strategy<Value = Option<BTreeMap<String, String>>> {
    prop::option::of(prop::collection::btree_map(text(), text(), 0..6))
}

/// Generate a fully specified event. Ids and timestamps are always set, so
/// appends of the same event are deterministic.
pub fn event() -> impl Strategy<Value = IdentityEvent> {
    (
        "[a-f0-9]{32}",
        event_type(),
        timestamp(),
        actor_id(),
        prop::sample::select(vec!["", "normal", "high"]),
        payload(),
    )
        .prop_map(|(id, kind, timestamp, actor_id, risk, payload)| IdentityEvent {
            id,
            kind,
            timestamp: Some(timestamp),
            actor_id,
            risk: risk.to_string(),
            payload,
        })
}

/// Generate a sequence of events.
pub fn events(max_len: usize) -> impl Strategy<Value = Vec<IdentityEvent>> {
    prop::collection::vec(event(), 0..=max_len)
}

/// Generate a RiskLevel.
pub fn risk_level() -> impl Strategy<Value = RiskLevel> {
    prop_oneof![Just(RiskLevel::Normal), Just(RiskLevel::High)]
}

/// Generate an arbitrary authentication context.
pub fn auth_context() -> impl Strategy<Value = AuthContext> {
    (any::<[bool; 4]>(), risk_level()).prop_map(|(f, risk)| AuthContext {
        long_phrase: f[0],
        email_otp: f[1],
        totp: f[2],
        hardware_key: f[3],
        risk,
    })
}
