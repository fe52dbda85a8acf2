//! Cryptographic primitives for identity chains.
//!
//! Wraps Ed25519 signing and SHA-256 hashing with strong types. Keys and
//! signatures travel as standard base64, hashes as lowercase hex.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::ChainError;

/// Errors decoding wire encodings of hashes, keys and signatures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {got}")]
    Length { expected: usize, got: usize },
}

fn fixed<const N: usize>(bytes: Vec<u8>) -> Result<[u8; N], DecodeError> {
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| DecodeError::Length { expected: N, got })
}

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. Must decode to exactly 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        Ok(Self(fixed(hex::decode(s)?)?))
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A raw 32-byte Ed25519 public key.
///
/// Serialized as standard base64, which is how chains store their root key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse from standard base64. Must decode to exactly 32 bytes.
    pub fn from_base64(s: &str) -> Result<Self, DecodeError> {
        Ok(Self(fixed(STANDARD.decode(s)?)?))
    }

    /// Verify a signature over a message.
    ///
    /// Fails if the key bytes are not a valid curve point or the signature
    /// does not verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureFailure> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| SignatureFailure::InvalidPublicKey)?;
        let sig = DalekSignature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| SignatureFailure::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &hex::encode(self.0)[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Why a signature check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFailure {
    #[error("public key is not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("signature does not verify")]
    InvalidSignature,
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn from_base64(s: &str) -> Result<Self, DecodeError> {
        Ok(Self(fixed(STANDARD.decode(s)?)?))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &hex::encode(self.0)[..16])
    }
}

/// A keypair for signing block links.
///
/// Wraps ed25519-dalek's SigningKey. `Debug` only ever prints the public half.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse secret key material.
    ///
    /// Accepts either the 32-byte seed or the 64-byte `seed || public` form.
    /// Empty material means no signer was supplied and is `Unauthorized`.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        match bytes.len() {
            0 => Err(ChainError::Unauthorized(
                "signer private key is required".into(),
            )),
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut pair = [0u8; 64];
                pair.copy_from_slice(bytes);
                let signing_key = SigningKey::from_keypair_bytes(&pair).map_err(|_| {
                    ChainError::InvalidInput(
                        "signer private key halves do not match".into(),
                    )
                })?;
                Ok(Self { signing_key })
            }
            n => Err(ChainError::InvalidInput(format!(
                "signer private key must be 32 or 64 bytes, got {n}"
            ))),
        }
    }

    /// Parse secret key material from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, ChainError> {
        let bytes = STANDARD.decode(s.trim()).map_err(|e| {
            ChainError::InvalidInput(format!("signer private key is not base64: {e}"))
        })?;
        Self::from_secret_bytes(&bytes)
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// The raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Export as base64 of the 64-byte `seed || public` form.
    pub fn to_keypair_base64(&self) -> String {
        STANDARD.encode(self.signing_key.to_keypair_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        keypair
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert_eq!(
            keypair.public_key().verify(tampered, &signature),
            Err(SignatureFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"m"), kp2.sign(b"m"));
    }

    #[test]
    fn test_secret_bytes_forms() {
        let kp = Keypair::from_seed(&[7u8; 32]);

        let from_seed = Keypair::from_secret_bytes(&kp.seed()).unwrap();
        assert_eq!(from_seed.public_key(), kp.public_key());

        let exported = kp.to_keypair_base64();
        let from_pair = Keypair::from_base64(&exported).unwrap();
        assert_eq!(from_pair.public_key(), kp.public_key());
    }

    #[test]
    fn test_empty_secret_is_unauthorized() {
        assert!(matches!(
            Keypair::from_secret_bytes(&[]),
            Err(ChainError::Unauthorized(_))
        ));
        assert!(matches!(
            Keypair::from_base64(""),
            Err(ChainError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_bad_secret_is_invalid_input() {
        assert!(matches!(
            Keypair::from_secret_bytes(&[1u8; 10]),
            Err(ChainError::InvalidInput(_))
        ));
        assert!(matches!(
            Keypair::from_base64("not base64!"),
            Err(ChainError::InvalidInput(_))
        ));

        // 64 bytes whose public half belongs to a different seed.
        let mut pair = [0u8; 64];
        pair[..32].copy_from_slice(&[1u8; 32]);
        pair[32..].copy_from_slice(Keypair::from_seed(&[2u8; 32]).public_key().as_bytes());
        assert!(matches!(
            Keypair::from_secret_bytes(&pair),
            Err(ChainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sha256_known_answer() {
        assert_eq!(
            Sha256Hash::hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_hex_rejects_wrong_length() {
        assert!(matches!(
            Sha256Hash::from_hex("abcd"),
            Err(DecodeError::Length { expected: 32, got: 2 })
        ));
        assert!(matches!(Sha256Hash::from_hex("zz"), Err(DecodeError::Hex(_))));
    }

    #[test]
    fn test_public_key_serde_is_base64() {
        let pk = Keypair::from_seed(&[9u8; 32]).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_base64()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }
}
