//! Text coders behind transportable data.
//!
//! A [`DataCoder`] turns raw bytes into a transport-safe string and back.
//! The identity core never hand-rolls these encodings; each coder is a thin
//! adapter over an ecosystem crate (`base64`, `bs58`, `hex`).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use thiserror::Error;

use crate::config::{ENCODING_BASE58, ENCODING_BASE64, ENCODING_HEX};

/// Errors raised while decoding transportable text.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("invalid {algorithm} text: {reason}")]
    InvalidText {
        algorithm: &'static str,
        reason: String,
    },

    #[error("unsupported encoding: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed transportable data: {0}")]
    Malformed(&'static str),
}

/// A reversible bytes <-> text encoding, identified by its algorithm tag.
pub trait DataCoder: fmt::Debug + Send + Sync {
    fn algorithm(&self) -> &str;

    fn encode(&self, data: &[u8]) -> String;

    fn decode(&self, text: &str) -> Result<Vec<u8>, EncodingError>;
}

/// Standard (padded) base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Coder;

impl DataCoder for Base64Coder {
    fn algorithm(&self) -> &str {
        ENCODING_BASE64
    }

    fn encode(&self, data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        // Tolerate line-wrapped input.
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| EncodingError::InvalidText {
                algorithm: ENCODING_BASE64,
                reason: e.to_string(),
            })
    }
}

/// Bitcoin-alphabet base58.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base58Coder;

impl DataCoder for Base58Coder {
    fn algorithm(&self) -> &str {
        ENCODING_BASE58
    }

    fn encode(&self, data: &[u8]) -> String {
        bs58::encode(data).into_string()
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        bs58::decode(text.trim())
            .into_vec()
            .map_err(|e| EncodingError::InvalidText {
                algorithm: ENCODING_BASE58,
                reason: e.to_string(),
            })
    }
}

/// Lowercase hex. Decoding accepts either case.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexCoder;

impl DataCoder for HexCoder {
    fn algorithm(&self) -> &str {
        ENCODING_HEX
    }

    fn encode(&self, data: &[u8]) -> String {
        hex::encode(data)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        let text = text.trim();
        let text = text.strip_prefix("0x").unwrap_or(text);
        hex::decode(text).map_err(|e| EncodingError::InvalidText {
            algorithm: ENCODING_HEX,
            reason: e.to_string(),
        })
    }
}
