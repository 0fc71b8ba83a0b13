//! # Entity Types
//!
//! The network byte embedded in every address says what kind of entity it
//! names. Classification is pure bit arithmetic so unknown future types
//! still sort themselves into user/group/broadcast:
//!
//! ```text
//! bit 7   broadcast
//! bit 0   group (clear = user)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::{
    ENTITY_ANY, ENTITY_BOT, ENTITY_BROADCAST_MASK, ENTITY_COMPANY, ENTITY_EVERY, ENTITY_GROUP,
    ENTITY_GROUP_MASK, ENTITY_ICP, ENTITY_ISP, ENTITY_STATION, ENTITY_SUPERVISOR, ENTITY_USER,
};

pub fn is_user(network: u8) -> bool {
    network & ENTITY_GROUP_MASK == 0
}

pub fn is_group(network: u8) -> bool {
    network & ENTITY_GROUP_MASK == ENTITY_GROUP_MASK
}

pub fn is_broadcast(network: u8) -> bool {
    network & ENTITY_BROADCAST_MASK == ENTITY_BROADCAST_MASK
}

/// The named entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityType {
    User = ENTITY_USER,
    Group = ENTITY_GROUP,
    Station = ENTITY_STATION,
    Isp = ENTITY_ISP,
    Bot = ENTITY_BOT,
    Icp = ENTITY_ICP,
    Supervisor = ENTITY_SUPERVISOR,
    Company = ENTITY_COMPANY,
    Any = ENTITY_ANY,
    Every = ENTITY_EVERY,
}

impl EntityType {
    pub const ALL: [EntityType; 10] = [
        Self::User,
        Self::Group,
        Self::Station,
        Self::Isp,
        Self::Bot,
        Self::Icp,
        Self::Supervisor,
        Self::Company,
        Self::Any,
        Self::Every,
    ];

    pub fn from_byte(network: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_byte() == network)
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Station => "station",
            Self::Isp => "isp",
            Self::Bot => "bot",
            Self::Icp => "icp",
            Self::Supervisor => "supervisor",
            Self::Company => "company",
            Self::Any => "any",
            Self::Every => "every",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = String;

    /// Accepts a name (`"user"`, case-insensitive) or a byte (`"1"`, `"0x81"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(t) = Self::ALL.into_iter().find(|t| t.name() == lower) {
            return Ok(t);
        }
        let byte = match lower.strip_prefix("0x") {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => lower.parse::<u8>(),
        }
        .map_err(|_| format!("unknown entity type: {s}"))?;
        Self::from_byte(byte).ok_or_else(|| format!("unknown entity type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_bits() {
        for t in [ENTITY_USER, ENTITY_STATION, ENTITY_BOT, ENTITY_SUPERVISOR] {
            assert!(is_user(t) && !is_group(t) && !is_broadcast(t), "{t:#04x}");
        }
        for t in [ENTITY_GROUP, ENTITY_ISP, ENTITY_ICP, ENTITY_COMPANY] {
            assert!(is_group(t) && !is_user(t) && !is_broadcast(t), "{t:#04x}");
        }
        assert!(is_user(ENTITY_ANY) && is_broadcast(ENTITY_ANY));
        assert!(is_group(ENTITY_EVERY) && is_broadcast(ENTITY_EVERY));
    }

    #[test]
    fn parse_names_and_bytes() {
        assert_eq!("USER".parse::<EntityType>().unwrap(), EntityType::User);
        assert_eq!("0x81".parse::<EntityType>().unwrap(), EntityType::Every);
        assert_eq!("7".parse::<EntityType>().unwrap(), EntityType::Company);
        assert!("0x42".parse::<EntityType>().is_err());
        assert!("person".parse::<EntityType>().is_err());
    }
}
