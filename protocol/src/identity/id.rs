//! # Entity IDs
//!
//! ```text
//! ID = [name "@"] address ["/" terminal]
//! ```
//!
//! - **name** mirrors the meta seed (absent for unseeded metas).
//! - **address** is the checksummed address derived from the meta.
//! - **terminal** names one login point of the entity (a device, a
//!   session). It is routing information, not identity: two IDs that differ
//!   only in terminal are equal and hash alike.
//!
//! Parsing splits on the last `@` for the name, then on the last `/` of
//! what remains for the terminal. Whatever is left must parse as an
//! address, so `moky@anywhere/a/b` is rejected rather than read as terminal
//! `a/b`.
//!
//! Parsing and creation go through the [`IdFactory`] installed on the
//! registries ([`GeneralIdFactory`] by default).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use super::address::Address;
use crate::config::FOUNDER_NAME;
use crate::registry::Registries;

/// Errors from the `FromStr` / serde surface of addresses and IDs.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid ID: {0}")]
    InvalidId(String),
}

#[derive(Clone)]
pub struct Id {
    name: Option<String>,
    address: Address,
    terminal: Option<String>,
}

fn non_empty(part: Option<String>) -> Option<String> {
    part.filter(|p| !p.is_empty())
}

impl Id {
    /// Build an ID from its parts. Empty name or terminal count as absent.
    pub fn new(name: Option<String>, address: Address, terminal: Option<String>) -> Self {
        Self {
            name: non_empty(name),
            address,
            terminal: non_empty(terminal),
        }
    }

    /// Parse through the shared registries.
    pub fn parse(id: &str) -> Option<Self> {
        Registries::shared().parse_id(id)
    }

    /// Split an ID string into `(name, address, terminal)` without checking
    /// the address.
    pub fn split(id: &str) -> Option<(Option<&str>, &str, Option<&str>)> {
        let (name, rest) = match id.rsplit_once('@') {
            Some((name, rest)) => (Some(name).filter(|n| !n.is_empty()), rest),
            None => (None, id),
        };
        let (address, terminal) = match rest.rsplit_once('/') {
            Some((address, terminal)) => (address, Some(terminal).filter(|t| !t.is_empty())),
            None => (rest, None),
        };
        if address.is_empty() {
            return None;
        }
        Some((name, address, terminal))
    }

    /// `anyone@anywhere`: any single user.
    pub fn anyone() -> &'static Id {
        static ID_ANYONE: OnceLock<Id> = OnceLock::new();
        ID_ANYONE.get_or_init(|| Id::new(Some("anyone".into()), Address::anywhere().clone(), None))
    }

    /// `everyone@everywhere`: every member of every group.
    pub fn everyone() -> &'static Id {
        static ID_EVERYONE: OnceLock<Id> = OnceLock::new();
        ID_EVERYONE
            .get_or_init(|| Id::new(Some("everyone".into()), Address::everywhere().clone(), None))
    }

    /// `moky@anywhere`: the founder's broadcast alias.
    pub fn founder() -> &'static Id {
        static ID_FOUNDER: OnceLock<Id> = OnceLock::new();
        ID_FOUNDER
            .get_or_init(|| Id::new(Some(FOUNDER_NAME.into()), Address::anywhere().clone(), None))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn terminal(&self) -> Option<&str> {
        self.terminal.as_deref()
    }

    pub fn network(&self) -> u8 {
        self.address.network()
    }

    pub fn is_user(&self) -> bool {
        self.address.is_user()
    }

    pub fn is_group(&self) -> bool {
        self.address.is_group()
    }

    pub fn is_broadcast(&self) -> bool {
        self.address.is_broadcast()
    }

    /// This ID without its terminal.
    pub fn naked(&self) -> Id {
        Id {
            name: self.name.clone(),
            address: self.address.clone(),
            terminal: None,
        }
    }

    /// This ID at another terminal.
    pub fn with_terminal(&self, terminal: impl Into<String>) -> Id {
        Id::new(self.name.clone(), self.address.clone(), Some(terminal.into()))
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.name == other.name
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}@")?;
        }
        write!(f, "{}", self.address)?;
        if let Some(terminal) = &self.terminal {
            write!(f, "/{terminal}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| IdError::InvalidId(s.to_string()))
    }
}

impl Serialize for Id {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub trait IdFactory: Send + Sync {
    fn create_id(&self, name: Option<String>, address: Address, terminal: Option<String>) -> Id;

    /// Parse `id`, resolving its address through `registries`.
    fn parse_id(&self, id: &str, registries: &Registries) -> Option<Id>;
}

#[derive(Debug, Default)]
pub struct GeneralIdFactory;

impl IdFactory for GeneralIdFactory {
    fn create_id(&self, name: Option<String>, address: Address, terminal: Option<String>) -> Id {
        Id::new(name, address, terminal)
    }

    fn parse_id(&self, id: &str, registries: &Registries) -> Option<Id> {
        let (name, address, terminal) = Id::split(id)?;
        let address = registries.parse_address(address)?;
        Some(Id::new(
            name.map(str::to_owned),
            address,
            terminal.map(str::to_owned),
        ))
    }
}
