// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MKM Protocol — Identity Core
//!
//! Self-certifying identities without a central registry. Hand this library
//! a key pair and it derives a globally unique `name@address` that anyone
//! can check against the key, plus signed profile documents the owner can
//! keep editing.
//!
//! ## Architecture
//!
//! - **crypto** — Key capabilities (sign/verify, encrypt/decrypt) and the
//!   built-in algorithms: Ed25519, X25519, AES-256-GCM, PLAIN.
//! - **format** — How bytes ride inside JSON: TED strings and PNF files.
//! - **identity** — Meta, Address, ID. The part that makes identities
//!   self-certifying.
//! - **document** — Signed property bags (TAI) with visa and bulletin views.
//! - **registry** — Tag-keyed factory tables that rebuild all of the above
//!   from JSON, open to new algorithms at runtime.
//! - **config** — Protocol constants. Append-only.
//!
//! ## Quick tour
//!
//! ```
//! use mkm_protocol::config::ENTITY_USER;
//! use mkm_protocol::crypto::{Ed25519PrivateKey, PrivateKey};
//! use mkm_protocol::registry::Registries;
//!
//! let registries = Registries::shared();
//! let sk = Ed25519PrivateKey::generate();
//! let meta = registries.generate_meta("MKM", &sk, Some("moky")).unwrap();
//! let id = meta.generate_id(ENTITY_USER, None).unwrap();
//!
//! assert_eq!(id.name(), Some("moky"));
//! assert!(meta.match_id(&id));
//! assert!(meta.match_public_key(sk.public_key().as_ref()));
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Malformed input yields `None` or `false`, never a panic.
//! 2. Nothing is trusted because it parsed. Validity is recomputed or
//!    re-verified, never deserialized.
//! 3. Every wire form is plain JSON (`serde_json::Value`).

pub mod config;
pub mod crypto;
pub mod document;
pub mod format;
pub mod identity;
pub mod registry;

pub use document::{Bulletin, Document, Visa};
pub use format::{PortableNetworkFile, TransportableData};
pub use identity::{Address, Id, Meta};
pub use registry::Registries;
