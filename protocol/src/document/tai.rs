//! # TAI — the signed property bag
//!
//! A document is a set of JSON properties bound to an ID and signed by the
//! ID's key. Properties stay editable; every edit invalidates the signature
//! until the owner signs again.
//!
//! ```text
//!            set_property()
//!   Signed ─────────────────▶ Unsigned
//!     ▲                          │
//!     │ sign(SK)                 │ sign(SK)
//!     └──────────────────────────┘
//!
//!   (data, signature) ── verify(PK) ──▶ valid / invalid
//! ```
//!
//! `data` is the exact JSON text that was signed. Verification never
//! re-serializes; it checks the signature over the stored text and only
//! then replaces the in-memory properties with what that text says. A
//! received document shows no properties until it has been verified.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::crypto::{SignKey, VerifyKey};
use crate::format::TransportableData;
use crate::identity::Id;

const PROPERTY_TIME: &str = "time";
const PROPERTY_NAME: &str = "name";

#[derive(Clone, Debug)]
pub struct Document {
    id: Id,
    doc_type: String,
    data: Option<String>,
    signature: Option<TransportableData>,
    properties: Map<String, Value>,
    valid: bool,
    extra: Map<String, Value>,
}

fn parse_properties(data: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("document data is not a JSON object");
            None
        }
        Err(e) => {
            debug!(error = %e, "document data is not valid JSON");
            None
        }
    }
}

impl Document {
    /// A fresh, unsigned document.
    pub fn new(doc_type: impl Into<String>, id: Id) -> Self {
        Self {
            id,
            doc_type: doc_type.into(),
            data: None,
            signature: None,
            properties: Map::new(),
            valid: false,
            extra: Map::new(),
        }
    }

    /// A document received as `(data, signature)`. Its properties stay empty
    /// until [`Document::verify`] accepts `data`.
    pub fn with_signature(
        doc_type: impl Into<String>,
        id: Id,
        data: String,
        signature: TransportableData,
    ) -> Self {
        Self {
            id,
            doc_type: doc_type.into(),
            data: Some(data),
            signature: Some(signature),
            properties: Map::new(),
            valid: false,
            extra: Map::new(),
        }
    }

    pub(crate) fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// The signed JSON text, if the document has been signed.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn signature(&self) -> Option<&TransportableData> {
        self.signature.as_ref()
    }

    /// Whether the last `sign` or `verify` succeeded with nothing changed
    /// since.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Set (or, with `Value::Null`, remove) a property. Always drops the
    /// signature.
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if value.is_null() {
            self.properties.remove(&key);
        } else {
            self.properties.insert(key, value);
        }
        self.data = None;
        self.signature = None;
        self.valid = false;
    }

    pub fn name(&self) -> Option<&str> {
        self.property(PROPERTY_NAME).and_then(Value::as_str)
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.set_property(PROPERTY_NAME, name.map_or(Value::Null, Value::from));
    }

    /// When the document was last signed.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let seconds = self.property(PROPERTY_TIME)?.as_f64()?;
        Utc.timestamp_millis_opt((seconds * 1000.0) as i64).single()
    }

    /// Serialize the properties and sign them.
    ///
    /// Stamps `time` first. A document that is already valid is returned
    /// as is, with its existing signature.
    pub fn sign<K>(&mut self, key: &K) -> Option<TransportableData>
    where
        K: SignKey + ?Sized,
    {
        if self.valid {
            if let Some(signature) = &self.signature {
                return Some(signature.clone());
            }
        }
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;
        self.properties.insert(PROPERTY_TIME.into(), Value::from(now));

        let data = match serde_json::to_string(&self.properties) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, id = %self.id, "failed to serialize document");
                return None;
            }
        };
        let signature = TransportableData::base64(key.sign(data.as_bytes()));
        self.data = Some(data);
        self.signature = Some(signature.clone());
        self.valid = true;
        Some(signature)
    }

    /// Check the stored `(data, signature)` against `key`.
    ///
    /// On success the properties are reloaded from `data`. On failure the
    /// document is marked invalid and the properties are left alone.
    pub fn verify<K>(&mut self, key: &K) -> bool
    where
        K: VerifyKey + ?Sized,
    {
        self.valid = false;
        let (Some(data), Some(signature)) = (&self.data, &self.signature) else {
            return false;
        };
        if !key.verify(data.as_bytes(), signature.data()) {
            debug!(id = %self.id, doc_type = %self.doc_type, "document signature mismatch");
            return false;
        }
        let Some(properties) = parse_properties(data) else {
            return false;
        };
        self.properties = properties;
        self.valid = true;
        true
    }

    /// Wire form: `{ "did", "type", "data"?, "signature"? }`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        map.insert("did".into(), Value::String(self.id.to_string()));
        map.insert("type".into(), Value::String(self.doc_type.clone()));
        if let Some(data) = &self.data {
            map.insert("data".into(), Value::String(data.clone()));
        }
        if let Some(signature) = &self.signature {
            map.insert("signature".into(), signature.to_value());
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}
