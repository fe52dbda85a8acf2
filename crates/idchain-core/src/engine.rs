//! Chain engine: create chains, append signed links, verify integrity.
//!
//! All three operations are pure functions of their inputs plus a clock
//! read. Persistence is the store's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::canonical::{event_hash, is_zero_timestamp, link_hash};
use crate::crypto::{Keypair, PublicKey, Sha256Hash, Signature, SignatureFailure};
use crate::error::{ChainError, Result, VerifyError};
use crate::types::{BlockLink, IdentityChain, IdentityEvent, GENESIS_PREV_HASH};

/// Create an empty chain bound to `root_public_key`.
pub fn create_chain(owner_id: &str, root_public_key: PublicKey) -> Result<IdentityChain> {
    if owner_id.is_empty() {
        return Err(ChainError::InvalidInput("owner_id is required".into()));
    }
    Ok(IdentityChain {
        owner_id: owner_id.to_string(),
        root_public_key: root_public_key.to_base64(),
        created_at: Utc::now(),
        blocks: Vec::new(),
    })
}

/// Append `event` as the next block, signed by `signer`.
///
/// Returns the extended chain; `chain` itself is never modified.
pub fn append_event(
    chain: &IdentityChain,
    event: IdentityEvent,
    signer: &Keypair,
) -> Result<IdentityChain> {
    append_event_at(chain, event, signer, Utc::now())
}

/// [`append_event`] with an explicit clock reading for the default timestamp.
///
/// The caller is expected to have defaulted `actor_id` to the chain owner.
pub fn append_event_at(
    chain: &IdentityChain,
    mut event: IdentityEvent,
    signer: &Keypair,
    now: DateTime<Utc>,
) -> Result<IdentityChain> {
    let root = chain
        .root_key()
        .map_err(|e| ChainError::InvalidInput(format!("chain root public key: {e}")))?;
    let signer_public_key = signer.public_key();
    if signer_public_key != root {
        return Err(ChainError::Unauthorized(
            "signer is not the root owner key".into(),
        ));
    }
    if event.actor_id.is_empty() {
        return Err(ChainError::InvalidInput("actor_id is required".into()));
    }
    if event.timestamp.map_or(true, |ts| is_zero_timestamp(&ts)) {
        event.timestamp = Some(now);
    }
    if event.id.is_empty() {
        event.id = new_event_id();
    }

    let event_hash = event_hash(&event).to_hex();
    let prev_hash = chain
        .head()
        .map(|b| b.hash.clone())
        .unwrap_or_else(|| GENESIS_PREV_HASH.to_string());
    let index = chain.blocks.len() as u64;

    let hash = link_hash(index, &prev_hash, &event_hash);
    let signature = signer.sign(hash.as_bytes());

    tracing::debug!(
        owner_id = %chain.owner_id,
        index,
        event_id = %event.id,
        kind = %event.kind,
        "appending block"
    );

    let mut next = chain.clone();
    next.blocks.push(BlockLink {
        index,
        prev_hash,
        event_hash,
        hash: hash.to_hex(),
        signature: signature.to_base64(),
        signer_public_key: signer_public_key.to_base64(),
    });
    Ok(next)
}

/// Verify every block front to back, stopping at the first failure.
///
/// A chain with no blocks is valid.
pub fn verify_chain(chain: &IdentityChain) -> std::result::Result<(), VerifyError> {
    let mut expected_prev = GENESIS_PREV_HASH;

    for (position, block) in chain.blocks.iter().enumerate() {
        let index = position as u64;
        verify_block(chain, block, index, expected_prev)?;
        expected_prev = block.hash.as_str();
    }
    Ok(())
}

fn verify_block(
    chain: &IdentityChain,
    block: &BlockLink,
    index: u64,
    expected_prev: &str,
) -> std::result::Result<(), VerifyError> {
    if block.index != index {
        return Err(VerifyError::Linkage {
            index,
            reason: format!("index field is {}", block.index),
        });
    }
    if block.prev_hash != expected_prev {
        return Err(VerifyError::Linkage {
            index,
            reason: "prev hash mismatch".into(),
        });
    }

    let rebuilt = link_hash(block.index, &block.prev_hash, &block.event_hash);
    if block.hash != rebuilt.to_hex() {
        return Err(VerifyError::Integrity {
            index,
            reason: "hash mismatch".into(),
        });
    }

    let encoding = |what: &str, e: &dyn std::fmt::Display| VerifyError::Encoding {
        index,
        reason: format!("{what}: {e}"),
    };
    let signer = PublicKey::from_base64(&block.signer_public_key)
        .map_err(|e| encoding("signer public key", &e))?;
    let signature =
        Signature::from_base64(&block.signature).map_err(|e| encoding("signature", &e))?;
    let hash = Sha256Hash::from_hex(&block.hash).map_err(|e| encoding("hash", &e))?;

    let root = chain
        .root_key()
        .map_err(|e| encoding("chain root public key", &e))?;
    if signer != root {
        return Err(VerifyError::Signature {
            index,
            reason: "signer is not the chain root key".into(),
        });
    }
    signer
        .verify(hash.as_bytes(), &signature)
        .map_err(|e| match e {
            SignatureFailure::InvalidPublicKey => encoding("signer public key", &e),
            SignatureFailure::InvalidSignature => VerifyError::Signature {
                index,
                reason: "signature verification failed".into(),
            },
        })
}

/// A random (v4 UUID) event id as 32 lowercase hex digits.
pub fn new_event_id() -> String {
    Uuid::new_v4().simple().to_string()
}
