//! # Hashing Utilities
//!
//! The digests behind address derivation:
//!
//! - **SHA-256** and **RIPEMD-160** for BTC-style addresses:
//!   `ripemd160(sha256(payload))`, checksummed with double SHA-256.
//! - **Keccak-256** for ETH-style addresses and their EIP-55 casing.
//!
//! All functions return fixed-size arrays; callers slice what they need.
//!
//! Address factories do not call these functions directly. They hold a
//! [`Digester`] per algorithm, so a different implementation (a hardware
//! module, a test double) can be plugged in without touching the encoders.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// SHA-256 of `data`.
///
/// # Example
///
/// ```
/// use mkm_protocol::crypto::sha256;
///
/// let hash = sha256(b"moky");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// `SHA-256(SHA-256(data))`, the BTC checksum primitive.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let mut output = [0u8; 20];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Keccak-256 of `data` (the pre-standard SHA-3 padding Ethereum uses).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

// ---------------------------------------------------------------------------
// Digesters
// ---------------------------------------------------------------------------

/// A hash function behind a trait object, registered by algorithm name.
pub trait Digester: Send + Sync {
    fn digest(&self, data: &[u8]) -> Vec<u8>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        sha256(data).to_vec()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ripemd160Digester;

impl Digester for Ripemd160Digester {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        ripemd160(data).to_vec()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256Digester;

impl Digester for Keccak256Digester {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        keccak256(data).to_vec()
    }
}

/// The first `N` bytes of `digest`, zero-padded when it is shorter.
pub(crate) fn truncate<const N: usize>(digest: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    for (slot, byte) in out.iter_mut().zip(digest) {
        *slot = *byte;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let expected = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(hex::encode(sha256(b"")), expected);
    }

    #[test]
    fn double_sha256_is_sha256_of_sha256() {
        assert_eq!(double_sha256(b"mkm"), sha256(&sha256(b"mkm")));
        assert_ne!(double_sha256(b"mkm"), sha256(b"mkm"));
    }

    #[test]
    fn test_ripemd160_known_vector() {
        let expected = "9c1185a5c5e9fc54612808977ee8f548b2258d31";
        assert_eq!(hex::encode(ripemd160(b"")), expected);
    }

    #[test]
    fn test_keccak256_known_vector() {
        // Keccak-256 of the empty string, not SHA3-256.
        let expected = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
        assert_eq!(hex::encode(keccak256(b"")), expected);
    }

    #[test]
    fn digesters_match_functions() {
        assert_eq!(Sha256Digester.digest(b"mkm"), sha256(b"mkm").to_vec());
        assert_eq!(Ripemd160Digester.digest(b"mkm"), ripemd160(b"mkm").to_vec());
        assert_eq!(Keccak256Digester.digest(b"mkm"), keccak256(b"mkm").to_vec());
    }

    #[test]
    fn truncate_pads_short_digests() {
        assert_eq!(truncate::<4>(&[1, 2, 3, 4, 5]), [1, 2, 3, 4]);
        assert_eq!(truncate::<4>(&[9]), [9, 0, 0, 0]);
    }
}
