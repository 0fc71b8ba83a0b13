//! # AES-256-GCM Symmetric Keys
//!
//! Used for encrypting PNF payloads before they are uploaded to a CDN, and
//! as the bulk cipher behind X25519 encryption keys.
//!
//! ## Nonce management
//!
//! Random 96-bit nonces from `OsRng`. The birthday bound is ~2^48 messages
//! per key, far beyond what a single file password ever sees.
//!
//! ## Wire format
//!
//! [`seal`] returns `nonce || ciphertext` as a single buffer; the first 12
//! bytes are the nonce, the rest is ciphertext plus the 16-byte tag.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::factory::SymmetricKeyFactory;
use super::keys::{
    fixed_bytes, CryptographyKey, DecryptKey, EncryptKey, KeyError, SymmetricKey,
};
use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, ALGORITHM_AES};
use crate::registry::Registries;

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, KeyError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| KeyError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| KeyError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`seal`].
///
/// Wrong key, truncation and bit flips all collapse into
/// [`KeyError::DecryptFailed`].
pub fn open(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, KeyError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(KeyError::DecryptFailed);
    }
    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| KeyError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| KeyError::DecryptFailed)
}

/// A 256-bit AES-GCM key.
#[derive(Clone, PartialEq, Eq)]
pub struct AesKey {
    bytes: [u8; AES_KEY_LENGTH],
}

impl AesKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; AES_KEY_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            bytes: fixed_bytes::<AES_KEY_LENGTH>(bytes)?,
        })
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(..)")
    }
}

impl CryptographyKey for AesKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_AES
    }

    fn data(&self) -> &[u8] {
        &self.bytes
    }
}

impl EncryptKey for AesKey {
    fn encrypt(&self, plaintext: &[u8]) -> Option<Vec<u8>> {
        seal(&self.bytes, plaintext).ok()
    }
}

impl DecryptKey for AesKey {
    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        open(&self.bytes, ciphertext).ok()
    }
}

impl SymmetricKey for AesKey {}

/// Builds AES keys from key maps.
#[derive(Debug, Default)]
pub struct AesKeyFactory;

impl SymmetricKeyFactory for AesKeyFactory {
    fn generate_symmetric_key(&self) -> Arc<dyn SymmetricKey> {
        Arc::new(AesKey::generate())
    }

    fn parse_symmetric_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn SymmetricKey>> {
        let data = registries.decode_data(key.get("data"))?;
        match AesKey::from_bytes(&data) {
            Ok(key) => Some(Arc::new(key)),
            Err(e) => {
                debug!(error = %e, "rejected AES key");
                None
            }
        }
    }
}
