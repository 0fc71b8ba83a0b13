//! # Identity Module
//!
//! Self-certifying identities derived from a key pair, with no central
//! registry involved.
//!
//! The identity stack is layered:
//!
//! 1. **Meta** — the identity root: a public key, optionally bound to a
//!    name (seed) by a fingerprint signature.
//! 2. **Address** — a short checksummed string derived from the meta for a
//!    given entity type (BTC-style base58 or ETH-style EIP-55 hex).
//! 3. **ID** — `name@address/terminal`, the handle everything else is keyed
//!    by. Whether it names a user, a group or a broadcast audience is read
//!    straight off the address's network byte.
//!
//! Anyone holding a meta can check that it produced a given ID
//! ([`Meta::match_id`]) and that a key belongs to it
//! ([`Meta::match_public_key`]).

pub mod address;
pub mod btc;
pub mod eth;
pub mod id;
pub mod meta;
pub mod network;

pub use address::{Address, AddressFactory};
pub use btc::{format_search_number, BtcAddressFactory};
pub use eth::EthAddressFactory;
pub use id::{GeneralIdFactory, Id, IdError, IdFactory};
pub use meta::{normalize_meta_type, DefaultMetaFactory, Meta, MetaFactory, MetaType};
pub use network::{is_broadcast, is_group, is_user, EntityType};
