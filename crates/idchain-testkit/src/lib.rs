//! # idchain testkit
//!
//! Testing utilities for idchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed events with their expected canonical bytes,
//!   event hash, link hash and signature under a fixed seed
//! - **Generators**: Proptest strategies for events, keys and auth contexts
//! - **Fixtures**: A keypair plus memory store with chain-building helpers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use idchain_testkit::vectors::{golden_chain, verify_all_vectors};
//!
//! verify_all_vectors().unwrap();
//! assert!(idchain_core::verify_chain(&golden_chain()).is_ok());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use idchain_testkit::generators::event;
//!
//! proptest! {
//!     #[test]
//!     fn event_hash_is_deterministic(e in event()) {
//!         prop_assert_eq!(idchain_core::event_hash(&e), idchain_core::event_hash(&e.clone()));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use idchain_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let chain = fixture.chain_with(3);
//! assert_eq!(chain.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_owner_fixtures, TestFixture};
pub use vectors::{all_vectors, golden_chain, verify_all_vectors, GoldenVector};
