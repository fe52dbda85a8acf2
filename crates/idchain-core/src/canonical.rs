//! Canonical encodings for hashed content.
//!
//! Two encodings are part of the wire contract:
//!
//! - **Events** are encoded as compact JSON with a fixed field order
//!   (`id, type, timestamp, actor_id, risk, payload`), payload keys sorted
//!   bytewise, RFC3339 UTC timestamps with trimmed fractional seconds, and
//!   HTML-safe string escaping. An absent payload is `null`, an empty one
//!   is `{}`.
//! - **Links** are hashed over `"{index}|{prev_hash}|{event_hash}"`.
//!
//! The encoder is hand-written rather than delegated to a serializer so the
//! bytes cannot drift with library defaults. Any change here changes every
//! event hash.

use chrono::{DateTime, Timelike, Utc};

use crate::crypto::Sha256Hash;
use crate::types::IdentityEvent;

/// Timestamp encoding used when an event has none.
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Encode an event to its canonical bytes.
pub fn canonical_event_bytes(event: &IdentityEvent) -> Vec<u8> {
    let mut buf = String::with_capacity(128);

    buf.push('{');
    encode_field(&mut buf, "id", &event.id);
    buf.push(',');
    encode_field(&mut buf, "type", event.kind.as_str());
    buf.push(',');
    let timestamp = match &event.timestamp {
        Some(ts) => canonical_timestamp(ts),
        None => ZERO_TIMESTAMP.to_string(),
    };
    encode_field(&mut buf, "timestamp", &timestamp);
    buf.push(',');
    encode_field(&mut buf, "actor_id", &event.actor_id);
    buf.push(',');
    encode_field(&mut buf, "risk", &event.risk);
    buf.push(',');

    encode_text(&mut buf, "payload");
    buf.push(':');
    match &event.payload {
        None => buf.push_str("null"),
        Some(payload) => {
            buf.push('{');
            // BTreeMap iterates in bytewise key order.
            for (i, (key, value)) in payload.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                encode_field(&mut buf, key, value);
            }
            buf.push('}');
        }
    }
    buf.push('}');

    buf.into_bytes()
}

/// SHA-256 of the canonical event bytes.
pub fn event_hash(event: &IdentityEvent) -> Sha256Hash {
    Sha256Hash::hash(&canonical_event_bytes(event))
}

/// The preimage of a link hash.
pub fn link_preimage(index: u64, prev_hash: &str, event_hash: &str) -> String {
    format!("{index}|{prev_hash}|{event_hash}")
}

/// Hash binding a link's position, predecessor and event.
pub fn link_hash(index: u64, prev_hash: &str, event_hash: &str) -> Sha256Hash {
    Sha256Hash::hash(link_preimage(index, prev_hash, event_hash).as_bytes())
}

/// Whether `ts` is the zero instant, which encodes like an absent timestamp.
pub fn is_zero_timestamp(ts: &DateTime<Utc>) -> bool {
    canonical_timestamp(ts) == ZERO_TIMESTAMP
}

/// RFC3339 in UTC with `Z`; fractional seconds only when non-zero, trailing
/// zeros trimmed.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    // Leap-second representation folds into the last second.
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

fn encode_field(buf: &mut String, key: &str, value: &str) {
    encode_text(buf, key);
    buf.push(':');
    encode_text(buf, value);
}

/// Encode a JSON string literal with HTML-safe escaping.
fn encode_text(buf: &mut String, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            '\u{2028}' => buf.push_str("\\u2028"),
            '\u{2029}' => buf.push_str("\\u2029"),
            c if (c as u32) < 0x20 || c == '<' || c == '>' || c == '&' => {
                let b = c as u32 as u8;
                buf.push_str("\\u00");
                buf.push(HEX[(b >> 4) as usize] as char);
                buf.push(HEX[(b & 0x0f) as usize] as char);
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventType;
    use chrono::TimeZone;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn encoded(event: &IdentityEvent) -> String {
        String::from_utf8(canonical_event_bytes(event)).unwrap()
    }

    #[test]
    fn test_field_order_and_sorted_payload() {
        let event = IdentityEvent::new(EventType::Login, "user:alice")
            .with_id("evt-1")
            .with_timestamp(ts("2025-01-14T12:00:00Z"))
            .with_risk("normal")
            .with_payload("ip", "127.0.0.1")
            .with_payload("device", "laptop");

        assert_eq!(
            encoded(&event),
            r#"{"id":"evt-1","type":"login","timestamp":"2025-01-14T12:00:00Z","actor_id":"user:alice","risk":"normal","payload":{"device":"laptop","ip":"127.0.0.1"}}"#
        );
    }

    #[test]
    fn test_absent_values() {
        let event = IdentityEvent::new(EventType::Recovery, "");
        assert_eq!(
            encoded(&event),
            r#"{"id":"","type":"recovery","timestamp":"0001-01-01T00:00:00Z","actor_id":"","risk":"","payload":null}"#
        );
    }

    #[test]
    fn test_empty_payload_differs_from_absent() {
        let absent = IdentityEvent::new(EventType::Login, "u");
        let mut empty = absent.clone();
        empty.payload = Some(Default::default());

        assert!(encoded(&empty).ends_with(r#""payload":{}}"#));
        assert!(encoded(&absent).ends_with(r#""payload":null}"#));
        assert_ne!(event_hash(&absent), event_hash(&empty));
    }

    #[test]
    fn test_timestamp_fraction_trimmed() {
        let base = Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap();
        assert_eq!(canonical_timestamp(&base), "2025-01-14T12:00:00Z");

        let half = base + chrono::Duration::milliseconds(500);
        assert_eq!(canonical_timestamp(&half), "2025-01-14T12:00:00.5Z");

        let nanos = base + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(canonical_timestamp(&nanos), "2025-01-14T12:00:00.123456789Z");

        let micros = base + chrono::Duration::microseconds(1_200);
        assert_eq!(canonical_timestamp(&micros), "2025-01-14T12:00:00.0012Z");
    }

    #[test]
    fn test_zero_timestamp_detection() {
        assert!(is_zero_timestamp(&ts("0001-01-01T00:00:00Z")));
        assert!(!is_zero_timestamp(&ts("0001-01-01T00:00:00.000000001Z")));
        assert!(!is_zero_timestamp(&ts("1970-01-01T00:00:00Z")));
    }

    #[test]
    fn test_string_escaping() {
        let mut buf = String::new();
        encode_text(&mut buf, "a\"b\\c\nd<e>&f\u{01}\u{2028}\u{e9}");
        assert_eq!(
            buf,
            r#""a\"b\\c\nd\u003ce\u003e\u0026f\u0001\u2028é""#
        );
    }

    #[test]
    fn test_payload_insertion_order_irrelevant() {
        let a = IdentityEvent::new(EventType::Login, "u")
            .with_payload("z", "1")
            .with_payload("a", "2");
        let b = IdentityEvent::new(EventType::Login, "u")
            .with_payload("a", "2")
            .with_payload("z", "1");
        assert_eq!(event_hash(&a), event_hash(&b));
    }

    #[test]
    fn test_link_preimage() {
        assert_eq!(link_preimage(0, "GENESIS", "ab"), "0|GENESIS|ab");
        assert_eq!(link_preimage(12, "cd", "ef"), "12|cd|ef");
    }
}
