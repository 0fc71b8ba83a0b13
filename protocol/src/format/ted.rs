//! # Transportable Encoded Data (TED)
//!
//! Raw bytes tagged with the text encoding used to carry them. Fingerprints,
//! signatures and key material all travel as TED.
//!
//! ## Text forms
//!
//! | Form                            | Meaning                               |
//! |---------------------------------|---------------------------------------|
//! | `"<encoded>"`                   | base64, the default                   |
//! | `"<alg>,<encoded>"`             | explicit encoding, e.g. `hex,dead`    |
//! | `"data:<mime>;<alg>,<encoded>"` | data URL with a content type          |
//! | `{ "algorithm", "data", ... }`  | map form, used when extra fields ride |
//!
//! Serialization always picks the shortest form that loses nothing.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::coder::{Base58Coder, Base64Coder, DataCoder, EncodingError, HexCoder};
use crate::config::DEFAULT_ENCODING;

const DATA_URL_PREFIX: &str = "data:";

/// Bytes plus the coder that renders them as text.
#[derive(Clone)]
pub struct TransportableData {
    coder: Arc<dyn DataCoder>,
    data: Vec<u8>,
    mime: Option<String>,
    extra: Map<String, Value>,
}

impl TransportableData {
    pub fn new(coder: Arc<dyn DataCoder>, data: Vec<u8>) -> Self {
        Self {
            coder,
            data,
            mime: None,
            extra: Map::new(),
        }
    }

    pub fn base64(data: Vec<u8>) -> Self {
        Self::new(Arc::new(Base64Coder), data)
    }

    pub fn base58(data: Vec<u8>) -> Self {
        Self::new(Arc::new(Base58Coder), data)
    }

    pub fn hex(data: Vec<u8>) -> Self {
        Self::new(Arc::new(HexCoder), data)
    }

    /// Attach a content type; the text form becomes a data URL.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub(crate) fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn algorithm(&self) -> &str {
        self.coder.algorithm()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Fields carried alongside `algorithm`/`data` in map form.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// The bytes in this TED's encoding, without any prefix.
    pub fn encoded(&self) -> String {
        self.coder.encode(&self.data)
    }

    /// Map form: `{ "algorithm", "data", "mime"?, ...extra }`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        map.insert("algorithm".into(), Value::String(self.algorithm().into()));
        map.insert("data".into(), Value::String(self.encoded()));
        if let Some(mime) = &self.mime {
            map.insert("mime".into(), Value::String(mime.clone()));
        }
        map
    }

    /// Wire value: a string unless extra fields force the map form.
    pub fn to_value(&self) -> Value {
        if self.extra.is_empty() {
            Value::String(self.to_string())
        } else {
            Value::Object(self.to_map())
        }
    }
}

impl fmt::Display for TransportableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.encoded();
        match &self.mime {
            Some(mime) => write!(f, "{DATA_URL_PREFIX}{mime};{},{encoded}", self.algorithm()),
            None if self.algorithm() == DEFAULT_ENCODING => f.write_str(&encoded),
            None => write!(f, "{},{encoded}", self.algorithm()),
        }
    }
}

impl fmt::Debug for TransportableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportableData")
            .field("algorithm", &self.algorithm())
            .field("len", &self.data.len())
            .field("mime", &self.mime)
            .finish()
    }
}

impl PartialEq for TransportableData {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm() == other.algorithm()
            && self.data == other.data
            && self.mime == other.mime
            && self.extra == other.extra
    }
}

impl Eq for TransportableData {}

// ---------------------------------------------------------------------------
// Text form
// ---------------------------------------------------------------------------

/// The pieces of a TED string before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TedText<'a> {
    pub mime: Option<&'a str>,
    pub algorithm: Option<&'a str>,
    pub encoded: &'a str,
}

impl<'a> TedText<'a> {
    /// Split a TED string into mime, algorithm and payload.
    ///
    /// None of the supported encodings use `,`, so the first comma always
    /// ends the header.
    pub fn split(text: &'a str) -> Result<Self, EncodingError> {
        if let Some(rest) = text.strip_prefix(DATA_URL_PREFIX) {
            let (header, encoded) = rest
                .split_once(',')
                .ok_or(EncodingError::Malformed("data URL without payload"))?;
            let (mime, algorithm) = match header.rsplit_once(';') {
                Some((mime, algorithm)) => (mime, Some(algorithm)),
                None => (header, None),
            };
            return Ok(Self {
                mime: Some(mime).filter(|m| !m.is_empty()),
                algorithm: algorithm.filter(|a| !a.is_empty()),
                encoded,
            });
        }
        Ok(match text.split_once(',') {
            Some((algorithm, encoded)) => Self {
                mime: None,
                algorithm: Some(algorithm).filter(|a| !a.is_empty()),
                encoded,
            },
            None => Self {
                mime: None,
                algorithm: None,
                encoded: text,
            },
        })
    }

    /// Rebuild the map form a factory parses.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "algorithm".into(),
            Value::String(self.algorithm.unwrap_or(DEFAULT_ENCODING).into()),
        );
        map.insert("data".into(), Value::String(self.encoded.into()));
        if let Some(mime) = self.mime {
            map.insert("mime".into(), Value::String(mime.into()));
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub trait TransportableDataFactory: Send + Sync {
    fn create_transportable_data(&self, data: Vec<u8>) -> TransportableData;

    /// Decode the map form. The `algorithm` field has already been used
    /// to pick this factory.
    fn parse_transportable_data(&self, ted: &Map<String, Value>) -> Option<TransportableData>;
}

/// Factory for any TED whose payload is a single encoded string.
#[derive(Debug)]
pub struct EncodedDataFactory {
    coder: Arc<dyn DataCoder>,
}

impl EncodedDataFactory {
    pub fn new(coder: Arc<dyn DataCoder>) -> Self {
        Self { coder }
    }
}

impl TransportableDataFactory for EncodedDataFactory {
    fn create_transportable_data(&self, data: Vec<u8>) -> TransportableData {
        TransportableData::new(Arc::clone(&self.coder), data)
    }

    fn parse_transportable_data(&self, ted: &Map<String, Value>) -> Option<TransportableData> {
        let encoded = ted.get("data")?.as_str()?;
        let data = match self.coder.decode(encoded) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "rejected transportable data");
                return None;
            }
        };
        let mut extra = ted.clone();
        extra.remove("algorithm");
        extra.remove("data");
        let mime = extra
            .remove("mime")
            .and_then(|m| m.as_str().map(str::to_owned));

        let mut parsed = TransportableData::new(Arc::clone(&self.coder), data).with_extra(extra);
        parsed.mime = mime;
        Some(parsed)
    }
}
