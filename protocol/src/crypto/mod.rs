//! # Cryptographic Primitives
//!
//! Key capabilities and the concrete algorithms behind them.
//!
//! - **Ed25519** for signatures — metas, fingerprints, document signatures.
//! - **X25519** for encryption keys published in visas.
//! - **AES-256-GCM** for symmetric keys (PNF passwords).
//! - **PLAIN** for files that were never encrypted.
//! - **SHA-256 / RIPEMD-160 / Keccak-256** for address derivation.
//!
//! Everything here is a thin wrapper around audited crates. New algorithms
//! plug in by implementing the traits in [`keys`] and registering a factory
//! from [`factory`] with [`crate::registry::Registries`].

pub mod aes;
pub mod ed25519;
pub mod factory;
pub mod hash;
pub mod keys;
pub mod plain;
pub mod x25519;

pub use aes::AesKey;
pub use ed25519::{Ed25519PrivateKey, Ed25519PublicKey};
pub use factory::{PrivateKeyFactory, PublicKeyFactory, SymmetricKeyFactory};
pub use hash::{
    double_sha256, keccak256, ripemd160, sha256, Digester, Keccak256Digester, Ripemd160Digester,
    Sha256Digester,
};
pub use keys::{
    keys_equal, match_asymmetric_keys, match_key_pair, match_symmetric_keys, CryptographyKey,
    DecryptKey, EncryptKey, KeyError, PrivateKey, PublicKey, SignKey, SymmetricKey, VerifyKey,
};
pub use plain::PlainKey;
pub use x25519::{X25519PrivateKey, X25519PublicKey};
