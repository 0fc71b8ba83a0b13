//! # ETH-style Addresses
//!
//! `"0x" + EIP-55(hex(Keccak-256(payload)[12..32]))`.
//!
//! EIP-55 encodes a checksum in the letter case: hex digit `i` is uppercased
//! when nibble `i` of `Keccak-256(lowercase_hex)` is 8 or more. ETH
//! addresses carry no network byte; they always classify as users.

use std::fmt;
use std::sync::Arc;

use super::address::{Address, AddressFactory};
use crate::config::{ENTITY_USER, ETH_HASH_LENGTH};
use crate::crypto::hash::{Digester, Keccak256Digester};

const PREFIX: &str = "0x";

pub struct EthAddressFactory {
    keccak256: Arc<dyn Digester>,
}

impl Default for EthAddressFactory {
    fn default() -> Self {
        Self::new(Arc::new(Keccak256Digester))
    }
}

impl fmt::Debug for EthAddressFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EthAddressFactory")
    }
}

impl EthAddressFactory {
    pub fn new(keccak256: Arc<dyn Digester>) -> Self {
        Self { keccak256 }
    }

    /// Apply EIP-55 casing to 40 lowercase hex digits.
    pub fn eip55(&self, lower_hex: &str) -> String {
        let hash = self.keccak256.digest(lower_hex.as_bytes());
        lower_hex
            .char_indices()
            .map(|(i, c)| {
                let byte = hash.get(i / 2).copied().unwrap_or_default();
                let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    /// Encode `payload` as a checksummed ETH address.
    pub fn encode(&self, payload: &[u8]) -> String {
        let digest = self.keccak256.digest(payload);
        let tail = &digest[digest.len().saturating_sub(ETH_HASH_LENGTH)..];
        format!("{PREFIX}{}", self.eip55(&hex::encode(tail)))
    }

    /// `true` for a `0x` address whose letter case matches its EIP-55
    /// checksum.
    pub fn is_valid(&self, address: &str) -> bool {
        let Some(digits) = address.strip_prefix(PREFIX) else {
            return false;
        };
        if digits.len() != ETH_HASH_LENGTH * 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
        self.eip55(&digits.to_ascii_lowercase()) == digits
    }
}

impl AddressFactory for EthAddressFactory {
    /// The requested network is ignored; ETH addresses are always users.
    fn generate_address(&self, payload: &[u8], _network: u8) -> Address {
        Address::new(self.encode(payload), ENTITY_USER)
    }

    fn parse_address(&self, address: &str) -> Option<Address> {
        self.is_valid(address)
            .then(|| Address::new(address, ENTITY_USER))
    }
}
