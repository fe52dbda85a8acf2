//! # idchain
//!
//! Per-owner identity chains: append-only logs of identity events where
//! every block is signed by the owner's root key and linked to its
//! predecessor by SHA-256.
//!
//! ## Overview
//!
//! - **Chain**: One per owner, bound at creation to a single Ed25519 root key.
//! - **Block**: Commits to one event by hash, to its predecessor by hash,
//!   and is signed by the root key.
//! - **Root action**: Any append. Gated by a long phrase plus two or three
//!   secondary factors depending on risk.
//!
//! ## Usage
//!
//! ```rust
//! use idchain::{IdentityService, AuthContext, RiskLevel};
//! use idchain::core::{EventType, IdentityEvent};
//! use idchain::store::MemoryStore;
//!
//! let service = IdentityService::new(MemoryStore::new());
//! let created = service.create_chain("user:alice", None).unwrap();
//! let key = created.root_private_key.unwrap();
//!
//! let auth = AuthContext {
//!     long_phrase: true,
//!     email_otp: true,
//!     totp: true,
//!     hardware_key: false,
//!     risk: RiskLevel::Normal,
//! };
//! let event = IdentityEvent::new(EventType::Login, "user:alice").with_payload("ip", "10.0.0.1");
//! service.append_event("user:alice", event, &key, &auth).unwrap();
//!
//! assert!(service.verify_chain("user:alice").unwrap().valid);
//! ```
//!
//! ## Re-exports
//!
//! - `idchain::core` - Chain primitives, canonical encoding, crypto
//! - `idchain::auth` - Root-action policy
//! - `idchain::store` - Store trait, file and memory stores

pub mod config;
pub mod error;
pub mod service;

pub use idchain_auth as auth;
pub use idchain_core as core;
pub use idchain_store as store;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use service::{CreatedChain, IdentityService, VerificationReport};

pub use idchain_auth::{AuthContext, RiskLevel};
pub use idchain_core::{BlockLink, EventType, IdentityChain, IdentityEvent, Keypair, PublicKey};
