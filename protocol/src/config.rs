//! # Protocol Configuration & Constants
//!
//! Every magic number of the identity core lives here: entity type bytes,
//! meta algorithm versions, key algorithm names, and wire-format tags.
//!
//! These values are part of the serialized form of metas, addresses and
//! documents. Changing one breaks every identity that was ever derived with
//! it, so treat this file as append-only.

// ---------------------------------------------------------------------------
// Entity (network) types
// ---------------------------------------------------------------------------

/// A person's account.
pub const ENTITY_USER: u8 = 0x00;

/// A group of people.
pub const ENTITY_GROUP: u8 = 0x01;

/// A service node (user-like).
pub const ENTITY_STATION: u8 = 0x02;

/// A service provider (group-like).
pub const ENTITY_ISP: u8 = 0x03;

/// An automated account.
pub const ENTITY_BOT: u8 = 0x04;

/// A content provider (group-like).
pub const ENTITY_ICP: u8 = 0x05;

/// An account with moderation rights.
pub const ENTITY_SUPERVISOR: u8 = 0x06;

/// A company (group-like).
pub const ENTITY_COMPANY: u8 = 0x07;

/// Broadcast to any single user: `anywhere`.
pub const ENTITY_ANY: u8 = 0x80;

/// Broadcast to every member: `everywhere`.
pub const ENTITY_EVERY: u8 = 0x81;

/// Bit set for every group-like entity.
pub const ENTITY_GROUP_MASK: u8 = 0x01;

/// Bit set for every broadcast entity.
pub const ENTITY_BROADCAST_MASK: u8 = 0x80;

// ---------------------------------------------------------------------------
// Meta algorithm versions
// ---------------------------------------------------------------------------

/// `username@address`: address derived from the fingerprint.
pub const META_MKM: &str = "1";

/// `btc_address`: address derived from the key data.
pub const META_BTC: &str = "2";

/// `username@btc_address`: BTC encoding, name bound by fingerprint.
pub const META_EXBTC: &str = "3";

/// `eth_address`: address derived from the key data.
pub const META_ETH: &str = "4";

/// `username@eth_address`: ETH encoding, name bound by fingerprint.
pub const META_EXETH: &str = "5";

/// Meta type assumed when a serialized meta carries no `type`.
pub const DEFAULT_META_TYPE: &str = META_MKM;

// ---------------------------------------------------------------------------
// Address algorithms
// ---------------------------------------------------------------------------

/// Base58 + RIPEMD-160 + double SHA-256 checksum.
pub const ADDRESS_BTC: &str = "BTC";

/// `0x` + EIP-55 mixed-case hex of a Keccak-256 digest.
pub const ADDRESS_ETH: &str = "ETH";

/// Literal string of the broadcast user address.
pub const ANYWHERE: &str = "anywhere";

/// Literal string of the broadcast group address.
pub const EVERYWHERE: &str = "everywhere";

/// Name part of the founder ID `moky@anywhere`.
pub const FOUNDER_NAME: &str = "moky";

/// RIPEMD-160 digest length.
pub const BTC_HASH_LENGTH: usize = 20;

/// Checksum length appended to BTC-style address bodies.
pub const BTC_CHECKSUM_LENGTH: usize = 4;

/// Decoded BTC-style address length: network + hash + checksum.
pub const BTC_ADDRESS_LENGTH: usize = 1 + BTC_HASH_LENGTH + BTC_CHECKSUM_LENGTH;

/// Number of address bytes kept from the Keccak-256 digest.
pub const ETH_HASH_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Digest algorithms
// ---------------------------------------------------------------------------

pub const DIGEST_SHA256: &str = "SHA-256";
pub const DIGEST_RIPEMD160: &str = "RIPEMD-160";
pub const DIGEST_KECCAK256: &str = "KECCAK-256";

// ---------------------------------------------------------------------------
// Key algorithms
// ---------------------------------------------------------------------------

/// Ed25519 signing keys.
pub const ALGORITHM_ED25519: &str = "Ed25519";

/// X25519 encryption keys (ephemeral DH + AES-256-GCM).
pub const ALGORITHM_X25519: &str = "X25519";

/// AES-256-GCM symmetric keys.
pub const ALGORITHM_AES: &str = "AES";

/// Pass-through symmetric key, the default PNF password.
pub const ALGORITHM_PLAIN: &str = "PLAIN";

/// Key algorithm assumed when a key map carries no `algorithm`.
pub const DEFAULT_KEY_ALGORITHM: &str = ALGORITHM_ED25519;

/// Symmetric algorithm assumed when a password map carries no `algorithm`.
pub const DEFAULT_SYMMETRIC_ALGORITHM: &str = ALGORITHM_AES;

/// Ed25519 / X25519 key length in bytes.
pub const CURVE_KEY_LENGTH: usize = 32;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// Sample message for checking that two keys belong together.
pub const KEY_PROMISE: &[u8] = b"Moky loves May Lee forever!";

// ---------------------------------------------------------------------------
// Transportable data
// ---------------------------------------------------------------------------

pub const ENCODING_BASE64: &str = "base64";
pub const ENCODING_BASE58: &str = "base58";
pub const ENCODING_HEX: &str = "hex";

/// TED algorithm assumed for bare strings and maps without `algorithm`.
pub const DEFAULT_ENCODING: &str = ENCODING_BASE64;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Wildcard document factory tag.
pub const DOCUMENT_ANY: &str = "*";

/// User document used for login and communication.
pub const DOCUMENT_VISA: &str = "visa";

/// Generic user profile.
pub const DOCUMENT_PROFILE: &str = "profile";

/// Group document.
pub const DOCUMENT_BULLETIN: &str = "bulletin";
