//! # idchain core
//!
//! Pure primitives for identity chains: per-owner, append-only logs where
//! every block is signed by the chain's single root key and linked to its
//! predecessor by hash.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! the chain data structures.
//!
//! ## Key Types
//!
//! - [`IdentityChain`] - The aggregate root, one per owner
//! - [`BlockLink`] - One signed, hash-bound link
//! - [`IdentityEvent`] - The activity an individual link commits to
//! - [`Keypair`] / [`PublicKey`] - Ed25519 keys
//!
//! ## Operations
//!
//! - [`create_chain`] - Build an empty chain bound to a root key
//! - [`append_event`] - Sign and link the next event
//! - [`verify_chain`] - Re-derive every link and signature
//!
//! ## Canonicalization
//!
//! Event hashes are computed over a fixed JSON encoding. See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod types;

pub use canonical::{canonical_event_bytes, event_hash, link_hash};
pub use crypto::{DecodeError, Keypair, PublicKey, Sha256Hash, Signature};
pub use engine::{append_event, append_event_at, create_chain, new_event_id, verify_chain};
pub use error::{ChainError, Result, VerifyError};
pub use types::{BlockLink, EventType, IdentityChain, IdentityEvent, GENESIS_PREV_HASH};
