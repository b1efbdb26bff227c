//! Snapshot encryption using AES-256-GCM.
//!
//! The 32-byte key is derived from the configured secret string with
//! HKDF-SHA256 and a per-snapshot random salt, so secrets of any length work.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, TabulaError};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the HKDF salt stored in the snapshot header.
pub const SALT_SIZE: usize = 16;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const KEY_INFO: &[u8] = b"tabuladb-snapshot-key-v1";

/// Derived key material, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct SnapshotKey {
    bytes: [u8; KEY_SIZE],
}

impl SnapshotKey {
    fn derive(secret: &str, salt: &[u8]) -> Result<Self> {
        let hk = Hkdf::<Sha256>::new(Some(salt), secret.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        hk.expand(KEY_INFO, &mut bytes)
            .map_err(|_| TabulaError::Config("snapshot key derivation failed".to_string()))?;
        Ok(Self { bytes })
    }
}

/// Seals and opens snapshot bodies.
pub struct SnapshotCipher {
    cipher: Aes256Gcm,
}

impl SnapshotCipher {
    /// Derive the key for `secret` and `salt`.
    pub fn new(secret: &str, salt: &[u8]) -> Result<Self> {
        let key = SnapshotKey::derive(secret, salt)?;
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&key.bytes));
        Ok(Self { cipher })
    }

    /// Fresh random salt for a new snapshot.
    pub fn generate_salt() -> [u8; SALT_SIZE] {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        salt
    }

    /// Encrypt `plaintext`, authenticating `aad` alongside it.
    ///
    /// Output: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, Payload { msg: plaintext, aad })
            .map_err(|_| TabulaError::Serialization("snapshot encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend(ciphertext);
        Ok(sealed)
    }

    /// Decrypt data produced by [`encrypt`](Self::encrypt).
    ///
    /// A wrong key and tampered bytes are indistinguishable; both are
    /// `SnapshotCorrupt`.
    pub fn decrypt(&self, sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TabulaError::SnapshotCorrupt("ciphertext too short".to_string()));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map_err(|_| {
                TabulaError::SnapshotCorrupt(
                    "decryption failed (wrong key or damaged file)".to_string(),
                )
            })
    }
}
