//! # Key Capabilities
//!
//! Every key in the identity core is a trait object. What a key can *do* is
//! expressed by the capability traits it implements:
//!
//! - [`SignKey`] / [`VerifyKey`] — asymmetric signatures.
//! - [`EncryptKey`] / [`DecryptKey`] — encryption, symmetric or asymmetric.
//!
//! Asymmetric keys come in halves. [`PrivateKey`] and [`PublicKey`] do not
//! promise any capability on their own; callers ask for one with
//! `as_sign_key()`, `as_verify_key()`, `as_encrypt_key()` or
//! `as_decrypt_key()` and get `None` when the algorithm cannot do it. An
//! Ed25519 public key verifies but cannot encrypt; an X25519 public key
//! encrypts but cannot verify.
//!
//! ## Pairing
//!
//! A private key and a public key found side by side are *not* assumed to
//! belong together. [`match_key_pair`] runs the promise message through a
//! sign-then-verify (or encrypt-then-decrypt) round trip first.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::KEY_PROMISE;
use crate::format::TransportableData;

/// Errors raised while building keys from raw material.
///
/// Key material never appears in an error message.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid public key bytes for {0}")]
    InvalidPublicKey(&'static str),

    #[error("key map is missing its 'data' field")]
    MissingData,

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,
}

/// Base trait of every key: an algorithm tag, raw key bytes and a map form.
pub trait CryptographyKey: fmt::Debug + Send + Sync {
    /// Algorithm tag, e.g. `"Ed25519"` or `"AES"`.
    fn algorithm(&self) -> &str;

    /// Raw key bytes. Secret for private and symmetric keys.
    fn data(&self) -> &[u8];

    /// Serialized key map: `{ "algorithm": ..., "data": <TED> }`.
    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("algorithm".into(), Value::String(self.algorithm().to_string()));
        map.insert(
            "data".into(),
            TransportableData::base64(self.data().to_vec()).to_value(),
        );
        map
    }
}

pub trait SignKey: CryptographyKey {
    /// Sign `data`, returning the raw signature bytes.
    fn sign(&self, data: &[u8]) -> Vec<u8>;
}

pub trait VerifyKey: CryptographyKey {
    /// `true` if `signature` is valid for `data`. Malformed signatures are
    /// simply invalid.
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool;
}

pub trait EncryptKey: CryptographyKey {
    /// Encrypt `plaintext`. `None` only on internal cipher failure.
    fn encrypt(&self, plaintext: &[u8]) -> Option<Vec<u8>>;
}

pub trait DecryptKey: CryptographyKey {
    /// Decrypt `ciphertext`; `None` for a wrong key or tampered input.
    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>>;
}

/// A key that both encrypts and decrypts.
pub trait SymmetricKey: EncryptKey + DecryptKey {}

/// The public half of an asymmetric key pair.
pub trait PublicKey: CryptographyKey {
    fn as_verify_key(&self) -> Option<&dyn VerifyKey> {
        None
    }

    fn as_encrypt_key(&self) -> Option<&dyn EncryptKey> {
        None
    }
}

/// The private half of an asymmetric key pair.
pub trait PrivateKey: CryptographyKey {
    /// The public key derived from this private key.
    fn public_key(&self) -> Arc<dyn PublicKey>;

    fn as_sign_key(&self) -> Option<&dyn SignKey> {
        None
    }

    fn as_decrypt_key(&self) -> Option<&dyn DecryptKey> {
        None
    }
}

/// Sign the promise message with `sign_key` and check it with `verify_key`.
pub fn match_asymmetric_keys<S, V>(sign_key: &S, verify_key: &V) -> bool
where
    S: SignKey + ?Sized,
    V: VerifyKey + ?Sized,
{
    let signature = sign_key.sign(KEY_PROMISE);
    verify_key.verify(KEY_PROMISE, &signature)
}

/// Encrypt the promise message with `encrypt_key` and check that
/// `decrypt_key` recovers it.
pub fn match_symmetric_keys<E, D>(encrypt_key: &E, decrypt_key: &D) -> bool
where
    E: EncryptKey + ?Sized,
    D: DecryptKey + ?Sized,
{
    let Some(ciphertext) = encrypt_key.encrypt(KEY_PROMISE) else {
        return false;
    };
    decrypt_key
        .decrypt(&ciphertext)
        .map(|plaintext| plaintext == KEY_PROMISE)
        .unwrap_or(false)
}

/// Check that `private` and `public` form a pair, using whichever
/// capability both halves share.
pub fn match_key_pair<S, P>(private: &S, public: &P) -> bool
where
    S: PrivateKey + ?Sized,
    P: PublicKey + ?Sized,
{
    if private.algorithm() != public.algorithm() {
        return false;
    }
    if let (Some(sk), Some(pk)) = (private.as_sign_key(), public.as_verify_key()) {
        return match_asymmetric_keys(sk, pk);
    }
    if let (Some(dk), Some(ek)) = (private.as_decrypt_key(), public.as_encrypt_key()) {
        return match_symmetric_keys(ek, dk);
    }
    false
}

/// Two keys are the same key when algorithm and key bytes agree.
pub fn keys_equal<A, B>(a: &A, b: &B) -> bool
where
    A: CryptographyKey + ?Sized,
    B: CryptographyKey + ?Sized,
{
    a.algorithm() == b.algorithm() && a.data() == b.data()
}

/// Copy a byte slice into a fixed-size array, reporting the length mismatch.
pub(crate) fn fixed_bytes<const N: usize>(bytes: &[u8]) -> Result<[u8; N], KeyError> {
    bytes.try_into().map_err(|_| KeyError::InvalidLength {
        expected: N,
        got: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::aes::AesKey;
    use crate::crypto::ed25519::Ed25519PrivateKey;
    use crate::crypto::plain::PlainKey;
    use crate::crypto::x25519::X25519PrivateKey;

    #[test]
    fn ed25519_pair_matches() {
        let sk = Ed25519PrivateKey::generate();
        let pk = sk.public_key();
        assert!(match_key_pair(&sk, pk.as_ref()));
    }

    #[test]
    fn mismatched_pair_rejected() {
        let sk1 = Ed25519PrivateKey::generate();
        let sk2 = Ed25519PrivateKey::generate();
        assert!(!match_key_pair(&sk1, sk2.public_key().as_ref()));
    }

    #[test]
    fn cross_algorithm_pair_rejected() {
        let ed = Ed25519PrivateKey::generate();
        let x = X25519PrivateKey::generate();
        assert!(!match_key_pair(&ed, x.public_key().as_ref()));
    }

    #[test]
    fn x25519_pair_matches_by_encryption() {
        let sk = X25519PrivateKey::generate();
        let pk = sk.public_key();
        assert!(pk.as_verify_key().is_none());
        assert!(match_key_pair(&sk, pk.as_ref()));
    }

    #[test]
    fn symmetric_keys_match_themselves_only() {
        let a = AesKey::generate();
        let b = AesKey::generate();
        assert!(match_symmetric_keys(&a, &a));
        assert!(!match_symmetric_keys(&a, &b));
        assert!(match_symmetric_keys(&PlainKey, &PlainKey));
    }

    #[test]
    fn fixed_bytes_reports_length() {
        let err = fixed_bytes::<32>(&[0u8; 5]).unwrap_err();
        assert!(matches!(err, KeyError::InvalidLength { expected: 32, got: 5 }));
    }
}
