//! # idchain store
//!
//! Persistence for identity chains.
//!
//! ## Implementations
//!
//! - [`FileStore`] - Single JSON document, atomic replace on every commit
//! - [`MemoryStore`] - Same semantics without persistence
//!
//! Stores know nothing about signatures or hashing. They hold chains keyed
//! by owner id and hand out independent copies.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::{FileStore, FileStoreConfig};
pub use memory::MemoryStore;
pub use traits::ChainStore;
