//! # Transport Formats
//!
//! How binary values travel inside JSON maps.
//!
//! - [`coder`] — base64 / base58 / hex text coders.
//! - [`ted`] — transportable encoded data: bytes tagged with their coder.
//! - [`pnf`] — portable network files: embedded or remote blobs with an
//!   optional decryption key.

pub mod coder;
pub mod pnf;
pub mod ted;

pub use coder::{Base58Coder, Base64Coder, DataCoder, EncodingError, HexCoder};
pub use pnf::{BaseFileFactory, PortableNetworkFile, PortableNetworkFileFactory};
pub use ted::{EncodedDataFactory, TedText, TransportableData, TransportableDataFactory};
