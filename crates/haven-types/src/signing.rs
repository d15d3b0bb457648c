//! Ed25519 signing identities.
//!
//! A client holds one signing identity per role it plays on the network: a
//! maid identity for account-scoped operations and a pmid identity per
//! storage offer it registers. The identity's *name* is the BLAKE3 hash of
//! its verifying key, which doubles as its network address.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::Identity;

/// An Ed25519 signing identity.
///
/// Key storage and passport lifecycle live outside this crate; this type only
/// signs bytes and derives its own name.
#[derive(Clone)]
pub struct SigningIdentity {
    key: SigningKey,
}

impl SigningIdentity {
    /// Generate a fresh identity from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild an identity from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    /// The identity's name: `BLAKE3(verifying_key)`.
    pub fn name(&self) -> Identity {
        *blake3::hash(self.key.verifying_key().as_bytes()).as_bytes()
    }

    /// The raw Ed25519 verifying key.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Sign a message, returning the detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("name", &hex::encode(self.name()))
            .finish_non_exhaustive()
    }
}

/// Verify a detached signature against a raw verifying key.
///
/// Returns `false` for malformed keys as well as bad signatures.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(vk) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    vk.verify_strict(message, &Signature::from_bytes(signature))
        .is_ok()
}
