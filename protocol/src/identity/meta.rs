//! # Meta — the identity root
//!
//! A meta binds a public key to an address. Everything else about an
//! entity (its ID, its documents) is checked against the meta's key.
//!
//! ## Algorithms
//!
//! | Type | Name  | Seeded | Address payload | Encoding |
//! |------|-------|--------|-----------------|----------|
//! | 1    | MKM   | yes    | fingerprint     | BTC      |
//! | 2    | BTC   | no     | key data        | BTC      |
//! | 3    | ExBTC | yes    | fingerprint     | BTC      |
//! | 4    | ETH   | no     | key data        | ETH      |
//! | 5    | ExETH | yes    | fingerprint     | ETH      |
//!
//! A seeded meta carries `fingerprint = sign(utf8(seed), private_key)`. The
//! seed becomes the ID's name, and because the address is derived from the
//! fingerprint, nobody without the private key can produce another meta
//! for the same `name@address`.
//!
//! ## Validity
//!
//! [`Meta::is_valid`] is recomputed on every call. Parsing a meta never
//! marks it trusted.
//!
//! ## Addresses
//!
//! A meta only names its address encoding (`BTC` or `ETH`). The encoder is
//! looked up in the address registry each time an address is generated, so
//! overriding `BTC` changes generation and parsing alike. The `Meta`
//! methods go through [`Registries::shared`]; call
//! [`Registries::generate_address`] to use another instance.

use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::address::Address;
use super::id::Id;
use crate::config::{
    ADDRESS_BTC, ADDRESS_ETH, META_BTC, META_ETH, META_EXBTC, META_EXETH, META_MKM,
};
use crate::crypto::{keys_equal, CryptographyKey, PrivateKey, PublicKey, SignKey, VerifyKey};
use crate::format::TransportableData;
use crate::registry::Registries;

// ---------------------------------------------------------------------------
// Meta types
// ---------------------------------------------------------------------------

/// The built-in meta algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    Mkm,
    Btc,
    ExBtc,
    Eth,
    ExEth,
}

impl MetaType {
    pub const ALL: [MetaType; 5] = [Self::Mkm, Self::Btc, Self::ExBtc, Self::Eth, Self::ExEth];

    /// Registry tag, as carried in the `type` field.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Mkm => META_MKM,
            Self::Btc => META_BTC,
            Self::ExBtc => META_EXBTC,
            Self::Eth => META_ETH,
            Self::ExEth => META_EXETH,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mkm => "MKM",
            Self::Btc => "BTC",
            Self::ExBtc => "ExBTC",
            Self::Eth => "ETH",
            Self::ExEth => "ExETH",
        }
    }

    pub fn is_seeded(self) -> bool {
        matches!(self, Self::Mkm | Self::ExBtc | Self::ExEth)
    }

    /// Look up by tag (`"1"`) or name (`"mkm"`, case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.tag() == tag || t.name().eq_ignore_ascii_case(tag))
    }

    /// Address registry tag this type encodes with.
    pub fn address_type(self) -> &'static str {
        match self {
            Self::Mkm | Self::Btc | Self::ExBtc => ADDRESS_BTC,
            Self::Eth | Self::ExEth => ADDRESS_ETH,
        }
    }
}

/// Canonical registry tag for a `type` (or legacy `version`) value.
///
/// Numbers become their decimal string, built-in names become their tag,
/// and any other string is kept verbatim for custom factories.
pub fn normalize_meta_type(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(
            MetaType::from_tag(s)
                .map(|t| t.tag().to_string())
                .unwrap_or_else(|| s.clone()),
        ),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Meta {
    meta_type: String,
    key: Arc<dyn PublicKey>,
    seed: Option<String>,
    fingerprint: Option<TransportableData>,
    seeded: bool,
    address_type: String,
    extra: Map<String, Value>,
}

impl Meta {
    /// Assemble a meta from verbatim parts.
    ///
    /// Returns `None` when the key cannot verify signatures, or when a
    /// seeded meta lacks its seed or fingerprint. Unseeded metas drop any
    /// seed or fingerprint passed in. The fingerprint is *not* checked here;
    /// see [`Meta::is_valid`].
    pub fn new(
        meta_type: impl Into<String>,
        key: Arc<dyn PublicKey>,
        seed: Option<String>,
        fingerprint: Option<TransportableData>,
        seeded: bool,
        address_type: impl Into<String>,
    ) -> Option<Self> {
        let meta_type = meta_type.into();
        if key.as_verify_key().is_none() {
            debug!(
                meta_type = %meta_type,
                algorithm = key.algorithm(),
                "meta key cannot verify"
            );
            return None;
        }
        let (seed, fingerprint) = if seeded {
            let seed = seed.filter(|s| !s.is_empty());
            if seed.is_none() || fingerprint.is_none() {
                debug!(meta_type = %meta_type, "seeded meta without seed or fingerprint");
                return None;
            }
            (seed, fingerprint)
        } else {
            (None, None)
        };
        Some(Self {
            meta_type,
            key,
            seed,
            fingerprint,
            seeded,
            address_type: address_type.into(),
            extra: Map::new(),
        })
    }

    pub(crate) fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn meta_type(&self) -> &str {
        &self.meta_type
    }

    pub fn public_key(&self) -> &Arc<dyn PublicKey> {
        &self.key
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    pub fn fingerprint(&self) -> Option<&TransportableData> {
        self.fingerprint.as_ref()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Tag of the address factory this meta encodes with.
    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    /// Unknown fields preserved from the parsed map.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn verify_key(&self) -> Option<&dyn VerifyKey> {
        self.key.as_verify_key()
    }

    /// Bytes the address is derived from: the fingerprint for seeded
    /// metas, the key data otherwise.
    pub fn payload(&self) -> Option<&[u8]> {
        if self.seeded {
            self.fingerprint.as_ref().map(TransportableData::data)
        } else {
            Some(self.key.data())
        }
    }

    /// Unseeded metas are always valid; seeded ones must carry a fingerprint
    /// that verifies over the seed with the meta's own key.
    pub fn is_valid(&self) -> bool {
        if !self.seeded {
            return true;
        }
        let (Some(seed), Some(fingerprint), Some(key)) =
            (&self.seed, &self.fingerprint, self.verify_key())
        else {
            return false;
        };
        key.verify(seed.as_bytes(), fingerprint.data())
    }

    /// Derive this meta's address on `network`. `None` for an invalid meta.
    pub fn generate_address(&self, network: u8) -> Option<Address> {
        Registries::shared().generate_address(self, network)
    }

    /// Derive this meta's ID on `network`, named after the seed.
    pub fn generate_id(&self, network: u8, terminal: Option<String>) -> Option<Id> {
        Registries::shared().generate_id(self, network, terminal)
    }

    /// `true` when `id` is the ID this meta generates on `id`'s network.
    pub fn match_id(&self, id: &Id) -> bool {
        Registries::shared().match_id(self, id)
    }

    /// `true` when `key` is this meta's key, or (for seeded metas) when
    /// `key` verifies the fingerprint.
    pub fn match_public_key<K>(&self, key: &K) -> bool
    where
        K: PublicKey + ?Sized,
    {
        if !self.is_valid() {
            return false;
        }
        if keys_equal(self.key.as_ref(), key) {
            return true;
        }
        let (Some(seed), Some(fingerprint), Some(verify_key)) =
            (&self.seed, &self.fingerprint, key.as_verify_key())
        else {
            return false;
        };
        verify_key.verify(seed.as_bytes(), fingerprint.data())
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        let type_value = match self.meta_type.parse::<u64>() {
            Ok(n) => Value::Number(Number::from(n)),
            Err(_) => Value::String(self.meta_type.clone()),
        };
        map.insert("type".into(), type_value);
        map.insert("key".into(), Value::Object(self.key.to_map()));
        if let Some(seed) = &self.seed {
            map.insert("seed".into(), Value::String(seed.clone()));
        }
        if let Some(fingerprint) = &self.fingerprint {
            map.insert("fingerprint".into(), fingerprint.to_value());
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

impl PartialEq for Meta {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("type", &self.meta_type)
            .field("key", &self.key)
            .field("seed", &self.seed)
            .field("fingerprint", &self.fingerprint)
            .field("address_type", &self.address_type)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub trait MetaFactory: Send + Sync {
    /// Build a meta from a private key, signing the seed when the type is
    /// seeded.
    fn generate_meta(&self, private_key: &dyn PrivateKey, seed: Option<&str>) -> Option<Meta>;

    /// Build a meta from verbatim parts.
    fn create_meta(
        &self,
        public_key: Arc<dyn PublicKey>,
        seed: Option<String>,
        fingerprint: Option<TransportableData>,
    ) -> Option<Meta>;

    fn parse_meta(&self, meta: &Map<String, Value>, registries: &Registries) -> Option<Meta>;
}

/// Factory for the five built-in meta types.
#[derive(Debug)]
pub struct DefaultMetaFactory {
    meta_type: MetaType,
}

impl DefaultMetaFactory {
    pub fn new(meta_type: MetaType) -> Self {
        Self { meta_type }
    }
}

impl MetaFactory for DefaultMetaFactory {
    fn generate_meta(&self, private_key: &dyn PrivateKey, seed: Option<&str>) -> Option<Meta> {
        let public_key = private_key.public_key();
        if !self.meta_type.is_seeded() {
            return self.create_meta(public_key, None, None);
        }
        let seed = seed.filter(|s| !s.is_empty())?;
        let Some(sign_key) = private_key.as_sign_key() else {
            debug!(algorithm = private_key.algorithm(), "meta key cannot sign");
            return None;
        };
        let fingerprint = TransportableData::base64(sign_key.sign(seed.as_bytes()));
        self.create_meta(public_key, Some(seed.to_string()), Some(fingerprint))
    }

    fn create_meta(
        &self,
        public_key: Arc<dyn PublicKey>,
        seed: Option<String>,
        fingerprint: Option<TransportableData>,
    ) -> Option<Meta> {
        Meta::new(
            self.meta_type.tag(),
            public_key,
            seed,
            fingerprint,
            self.meta_type.is_seeded(),
            self.meta_type.address_type(),
        )
    }

    fn parse_meta(&self, meta: &Map<String, Value>, registries: &Registries) -> Option<Meta> {
        let key = registries.parse_public_key(meta.get("key")?)?;
        let seed = meta.get("seed").and_then(Value::as_str).map(str::to_owned);
        let fingerprint = match meta.get("fingerprint") {
            Some(value) => Some(registries.parse_transportable_data(value)?),
            None => None,
        };

        let mut extra = meta.clone();
        for field in ["type", "version", "key", "seed", "fingerprint"] {
            extra.remove(field);
        }
        Some(self.create_meta(key, seed, fingerprint)?.with_extra(extra))
    }
}
