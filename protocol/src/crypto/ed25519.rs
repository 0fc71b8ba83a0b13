//! # Ed25519 Signing Keys
//!
//! The default asymmetric algorithm of the identity core. Metas built from
//! an Ed25519 key carry the 32-byte verifying key in their `key` map, and
//! fingerprints and document signatures are 64-byte Ed25519 signatures.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key generation uses `OsRng`.
//! - `Debug` output never includes secret bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::factory::{PrivateKeyFactory, PublicKeyFactory};
use super::keys::{
    fixed_bytes, CryptographyKey, KeyError, PrivateKey, PublicKey, SignKey, VerifyKey,
};
use crate::config::ALGORITHM_ED25519;
use crate::registry::Registries;

/// An Ed25519 private key.
pub struct Ed25519PrivateKey {
    signing_key: SigningKey,
}

/// An Ed25519 public (verifying) key.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    verifying_key: VerifyingKey,
}

impl Ed25519PrivateKey {
    /// Generate a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a key deterministically from a 32-byte seed. In Ed25519 the
    /// seed *is* the secret key.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build a key from raw secret bytes of any slice length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::from_seed(&fixed_bytes::<32>(bytes)?))
    }

    /// The concrete public half.
    pub fn ed25519_public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }
}

impl Clone for Ed25519PrivateKey {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ed25519PrivateKey(pub={})",
            hex::encode(self.signing_key.verifying_key().as_bytes())
        )
    }
}

impl CryptographyKey for Ed25519PrivateKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_ED25519
    }

    fn data(&self) -> &[u8] {
        self.signing_key.as_bytes()
    }
}

impl SignKey for Ed25519PrivateKey {
    fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.signing_key.sign(data).to_bytes().to_vec()
    }
}

impl PrivateKey for Ed25519PrivateKey {
    fn public_key(&self) -> Arc<dyn PublicKey> {
        Arc::new(self.ed25519_public_key())
    }

    fn as_sign_key(&self) -> Option<&dyn SignKey> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Parse raw verifying key bytes, rejecting points that are not on the
    /// curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes = fixed_bytes::<32>(bytes)?;
        let verifying_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|_| KeyError::InvalidPublicKey(ALGORITHM_ED25519))?;
        Ok(Self { verifying_key })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.verifying_key.as_bytes())
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", &self.to_hex()[..16])
    }
}

impl CryptographyKey for Ed25519PublicKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_ED25519
    }

    fn data(&self) -> &[u8] {
        self.verifying_key.as_bytes()
    }
}

impl VerifyKey for Ed25519PublicKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        let signature = Signature::from_bytes(&bytes);
        self.verifying_key.verify(data, &signature).is_ok()
    }
}

impl PublicKey for Ed25519PublicKey {
    fn as_verify_key(&self) -> Option<&dyn VerifyKey> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Builds Ed25519 keys from key maps.
#[derive(Debug, Default)]
pub struct Ed25519KeyFactory;

impl PrivateKeyFactory for Ed25519KeyFactory {
    fn generate_private_key(&self) -> Arc<dyn PrivateKey> {
        Arc::new(Ed25519PrivateKey::generate())
    }

    fn parse_private_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PrivateKey>> {
        let data = registries.decode_data(key.get("data"))?;
        match Ed25519PrivateKey::from_bytes(&data) {
            Ok(sk) => Some(Arc::new(sk)),
            Err(e) => {
                debug!(error = %e, "rejected Ed25519 private key");
                None
            }
        }
    }
}

impl PublicKeyFactory for Ed25519KeyFactory {
    fn parse_public_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PublicKey>> {
        let data = registries.decode_data(key.get("data"))?;
        match Ed25519PublicKey::from_bytes(&data) {
            Ok(pk) => Some(Arc::new(pk)),
            Err(e) => {
                debug!(error = %e, "rejected Ed25519 public key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let sk = Ed25519PrivateKey::generate();
        let pk = sk.ed25519_public_key();
        let sig = sk.sign(b"moky");
        assert_eq!(sig.len(), 64);
        assert!(pk.verify(b"moky", &sig));
        assert!(!pk.verify(b"Moky", &sig));
    }

    #[test]
    fn truncated_signature_is_invalid_not_a_panic() {
        let sk = Ed25519PrivateKey::generate();
        let sig = sk.sign(b"data");
        assert!(!sk.ed25519_public_key().verify(b"data", &sig[..63]));
        assert!(!sk.ed25519_public_key().verify(b"data", &[]));
    }

    #[test]
    fn signatures_are_deterministic() {
        let sk = Ed25519PrivateKey::from_seed(&[7u8; 32]);
        assert_eq!(sk.sign(b"hello"), sk.sign(b"hello"));
    }

    #[test]
    fn capabilities() {
        let sk = Ed25519PrivateKey::generate();
        assert!(sk.as_sign_key().is_some());
        assert!(sk.as_decrypt_key().is_none());
        let pk = sk.public_key();
        assert!(pk.as_verify_key().is_some());
        assert!(pk.as_encrypt_key().is_none());
    }

    #[test]
    fn key_map_roundtrip_through_factory() {
        let registries = Registries::with_defaults();
        let sk = Ed25519PrivateKey::generate();
        let map = sk.to_map();
        assert_eq!(map["algorithm"], ALGORITHM_ED25519);

        let parsed = Ed25519KeyFactory.parse_private_key(&map, &registries).unwrap();
        assert_eq!(parsed.data(), sk.data());

        let pk_map = sk.public_key().to_map();
        let pk = Ed25519KeyFactory.parse_public_key(&pk_map, &registries).unwrap();
        assert_eq!(pk.data(), sk.ed25519_public_key().data());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(Ed25519PrivateKey::from_bytes(&[1u8; 16]).is_err());
        assert!(Ed25519PublicKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let sk = Ed25519PrivateKey::from_seed(&[0xAB; 32]);
        let debug_str = format!("{:?}", sk);
        assert!(debug_str.starts_with("Ed25519PrivateKey(pub="));
        assert!(!debug_str.contains(&hex::encode([0xABu8; 32])));
    }
}
