//! # Addresses
//!
//! An address is the short, checksummed string an ID is built around. It
//! is derived from a meta's payload and carries the entity type byte of the
//! network it was generated for.
//!
//! Encodings are pluggable through [`AddressFactory`]; the built-ins are
//! BTC-style base58 ([`super::btc`]) and ETH-style EIP-55 hex
//! ([`super::eth`]). Two reserved literals, `anywhere` and `everywhere`,
//! are recognized before any factory runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use super::btc;
use super::id::IdError;
use super::network;
use crate::config::{ANYWHERE, ENTITY_ANY, ENTITY_EVERY, EVERYWHERE};
use crate::registry::Registries;

/// A network-typed address string. Equality is string equality.
#[derive(Clone)]
pub struct Address {
    value: String,
    network: u8,
}

impl Address {
    /// Wrap an already-validated address string. Factories call this after
    /// checking the encoding; use [`Address::parse`] for untrusted input.
    pub fn new(value: impl Into<String>, network: u8) -> Self {
        Self {
            value: value.into(),
            network,
        }
    }

    /// Parse through the shared registries.
    pub fn parse(address: &str) -> Option<Self> {
        Registries::shared().parse_address(address)
    }

    /// `anywhere`, the broadcast user address.
    pub fn anywhere() -> &'static Address {
        static ADDRESS: OnceLock<Address> = OnceLock::new();
        ADDRESS.get_or_init(|| Address::new(ANYWHERE, ENTITY_ANY))
    }

    /// `everywhere`, the broadcast group address.
    pub fn everywhere() -> &'static Address {
        static ADDRESS: OnceLock<Address> = OnceLock::new();
        ADDRESS.get_or_init(|| Address::new(EVERYWHERE, ENTITY_EVERY))
    }

    /// Match the reserved broadcast literals (case-insensitive).
    pub fn parse_broadcast(address: &str) -> Option<Self> {
        if address.eq_ignore_ascii_case(ANYWHERE) {
            Some(Self::anywhere().clone())
        } else if address.eq_ignore_ascii_case(EVERYWHERE) {
            Some(Self::everywhere().clone())
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn network(&self) -> u8 {
        self.network
    }

    pub fn is_user(&self) -> bool {
        network::is_user(self.network)
    }

    pub fn is_group(&self) -> bool {
        network::is_group(self.network)
    }

    pub fn is_broadcast(&self) -> bool {
        network::is_broadcast(self.network)
    }

    /// The numeric handle of a BTC-style address, for lookup by phone-like
    /// digits. `None` for other encodings.
    pub fn search_number(&self) -> Option<u32> {
        btc::search_number(&self.value)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}, network={:#04x})", self.value, self.network)
    }
}

impl FromStr for Address {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| IdError::InvalidAddress(s.to_string()))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An address encoding.
pub trait AddressFactory: fmt::Debug + Send + Sync {
    /// Derive the address of `payload` on `network`.
    fn generate_address(&self, payload: &[u8], network: u8) -> Address;

    /// Decode and checksum-verify an address string. `None` when the string
    /// is not in this factory's encoding.
    fn parse_address(&self, address: &str) -> Option<Address>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_singletons() {
        assert!(std::ptr::eq(Address::anywhere(), Address::anywhere()));
        assert!(Address::anywhere().is_broadcast() && Address::anywhere().is_user());
        assert!(Address::everywhere().is_broadcast() && Address::everywhere().is_group());
    }

    #[test]
    fn broadcast_literals_parse_first() {
        assert_eq!(Address::parse("anywhere").unwrap(), *Address::anywhere());
        assert_eq!(Address::parse("Everywhere").unwrap(), *Address::everywhere());
        assert_eq!(Address::parse("everywhere").unwrap().network(), ENTITY_EVERY);
    }

    #[test]
    fn equality_ignores_network() {
        assert_eq!(Address::new("abc", 0), Address::new("abc", 1));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Address::parse("").is_none());
        assert!("not an address".parse::<Address>().is_err());
    }
}
