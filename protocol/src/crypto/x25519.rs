//! # X25519 Encryption Keys
//!
//! The encryption key a visa advertises. Ed25519 keys sign but cannot
//! encrypt, so a user publishes a separate X25519 public key for peers to
//! encrypt to.
//!
//! ## Construction
//!
//! Encryption is a one-shot ECIES:
//!
//! 1. Generate an ephemeral X25519 secret.
//! 2. `shared = DH(ephemeral, recipient)`.
//! 3. `key = BLAKE3-derive_key(CONTEXT, shared || ephemeral_pub || recipient_pub)`.
//! 4. `AES-256-GCM` seal with `key`.
//!
//! Wire format: `ephemeral_pub (32) || nonce (12) || ciphertext + tag`.
//!
//! The raw DH output is never used as a cipher key directly; it goes through
//! the KDF with both public keys bound in.

use rand::rngs::OsRng;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use x25519_dalek::{EphemeralSecret, PublicKey as DalekPublicKey, StaticSecret};

use super::aes;
use super::factory::{PrivateKeyFactory, PublicKeyFactory};
use super::keys::{
    fixed_bytes, CryptographyKey, DecryptKey, EncryptKey, KeyError, PrivateKey, PublicKey,
};
use crate::config::{ALGORITHM_X25519, CURVE_KEY_LENGTH};
use crate::registry::Registries;

/// KDF context string. Changing it breaks every ciphertext in flight.
const KDF_CONTEXT: &str = "mkm-protocol x25519 ecies v1";

fn derive_key(shared: &[u8; 32], ephemeral: &[u8; 32], recipient: &[u8; 32]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT);
    hasher.update(shared);
    hasher.update(ephemeral);
    hasher.update(recipient);
    *hasher.finalize().as_bytes()
}

/// An X25519 private key.
pub struct X25519PrivateKey {
    secret: StaticSecret,
}

/// An X25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct X25519PublicKey {
    public: DalekPublicKey,
}

impl X25519PrivateKey {
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            secret: StaticSecret::from(fixed_bytes::<CURVE_KEY_LENGTH>(bytes)?),
        })
    }

    pub fn x25519_public_key(&self) -> X25519PublicKey {
        X25519PublicKey {
            public: DalekPublicKey::from(&self.secret),
        }
    }
}

impl Clone for X25519PrivateKey {
    fn clone(&self) -> Self {
        Self {
            secret: StaticSecret::from(self.secret.to_bytes()),
        }
    }
}

impl fmt::Debug for X25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X25519PrivateKey(pub={})",
            hex::encode(DalekPublicKey::from(&self.secret).as_bytes())
        )
    }
}

impl CryptographyKey for X25519PrivateKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_X25519
    }

    fn data(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl DecryptKey for X25519PrivateKey {
    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        if ciphertext.len() < CURVE_KEY_LENGTH {
            return None;
        }
        let (ephemeral, sealed) = ciphertext.split_at(CURVE_KEY_LENGTH);
        let ephemeral: [u8; 32] = ephemeral.try_into().ok()?;
        let shared = self.secret.diffie_hellman(&DalekPublicKey::from(ephemeral));
        let recipient = DalekPublicKey::from(&self.secret);
        let key = derive_key(shared.as_bytes(), &ephemeral, recipient.as_bytes());
        aes::open(&key, sealed).ok()
    }
}

impl PrivateKey for X25519PrivateKey {
    fn public_key(&self) -> Arc<dyn PublicKey> {
        Arc::new(self.x25519_public_key())
    }

    fn as_decrypt_key(&self) -> Option<&dyn DecryptKey> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

impl X25519PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            public: DalekPublicKey::from(fixed_bytes::<CURVE_KEY_LENGTH>(bytes)?),
        })
    }
}

impl fmt::Debug for X25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X25519PublicKey({})", &hex::encode(self.public.as_bytes())[..16])
    }
}

impl CryptographyKey for X25519PublicKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_X25519
    }

    fn data(&self) -> &[u8] {
        self.public.as_bytes()
    }
}

impl EncryptKey for X25519PublicKey {
    fn encrypt(&self, plaintext: &[u8]) -> Option<Vec<u8>> {
        let ephemeral = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_pub = DalekPublicKey::from(&ephemeral);
        let shared = ephemeral.diffie_hellman(&self.public);
        let key = derive_key(
            shared.as_bytes(),
            ephemeral_pub.as_bytes(),
            self.public.as_bytes(),
        );
        let sealed = aes::seal(&key, plaintext).ok()?;

        let mut out = Vec::with_capacity(CURVE_KEY_LENGTH + sealed.len());
        out.extend_from_slice(ephemeral_pub.as_bytes());
        out.extend_from_slice(&sealed);
        Some(out)
    }
}

impl PublicKey for X25519PublicKey {
    fn as_encrypt_key(&self) -> Option<&dyn EncryptKey> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct X25519KeyFactory;

impl PrivateKeyFactory for X25519KeyFactory {
    fn generate_private_key(&self) -> Arc<dyn PrivateKey> {
        Arc::new(X25519PrivateKey::generate())
    }

    fn parse_private_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PrivateKey>> {
        let data = registries.decode_data(key.get("data"))?;
        match X25519PrivateKey::from_bytes(&data) {
            Ok(sk) => Some(Arc::new(sk)),
            Err(e) => {
                debug!(error = %e, "rejected X25519 private key");
                None
            }
        }
    }
}

impl PublicKeyFactory for X25519KeyFactory {
    fn parse_public_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PublicKey>> {
        let data = registries.decode_data(key.get("data"))?;
        match X25519PublicKey::from_bytes(&data) {
            Ok(pk) => Some(Arc::new(pk)),
            Err(e) => {
                debug!(error = %e, "rejected X25519 public key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let sk = X25519PrivateKey::generate();
        let pk = sk.x25519_public_key();
        let ct = pk.encrypt(b"hello bob").unwrap();
        assert_eq!(sk.decrypt(&ct).unwrap(), b"hello bob");
    }

    #[test]
    fn other_recipient_cannot_decrypt() {
        let alice = X25519PrivateKey::generate();
        let eve = X25519PrivateKey::generate();
        let ct = alice.x25519_public_key().encrypt(b"for alice only").unwrap();
        assert!(eve.decrypt(&ct).is_none());
    }

    #[test]
    fn truncated_ciphertext_rejected() {
        let sk = X25519PrivateKey::generate();
        assert!(sk.decrypt(&[0u8; 10]).is_none());
        assert!(sk.decrypt(&[0u8; 40]).is_none());
    }

    #[test]
    fn restored_key_decrypts() {
        let sk = X25519PrivateKey::generate();
        let ct = sk.x25519_public_key().encrypt(b"persisted").unwrap();
        let restored = X25519PrivateKey::from_bytes(sk.data()).unwrap();
        assert_eq!(restored.decrypt(&ct).unwrap(), b"persisted");
    }
}
