//! # Documents
//!
//! Signed, mutable profile data bound to an ID.
//!
//! - [`tai`] — the generic [`Document`]: properties, `sign`, `verify`.
//! - [`visa`] — a user's public card (encryption key, terminal, avatar).
//! - [`bulletin`] — a group's founder and assistants.
//! - [`factory`] — per-type construction and parsing.
//!
//! Typed views wrap a [`Document`] and deref to it; signing always goes
//! through the document itself.

pub mod bulletin;
pub mod factory;
pub mod tai;
pub mod visa;

pub use bulletin::Bulletin;
pub use factory::{DocumentFactory, GeneralDocumentFactory};
pub use tai::Document;
pub use visa::Visa;
