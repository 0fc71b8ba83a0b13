//! # Factory Registries
//!
//! Every polymorphic value in the identity core (metas, addresses, keys,
//! documents, transportable data, files) is rebuilt from its JSON form by a
//! factory picked from a tag inside the map:
//!
//! | Concern            | Discriminator              | Default when missing      |
//! |--------------------|----------------------------|---------------------------|
//! | Meta               | `type` (legacy `version`)  | `1` (MKM)                 |
//! | Address            | tried in tag order         | n/a                       |
//! | ID                 | single slot                | n/a                       |
//! | Private/public key | `algorithm`                | `Ed25519`                 |
//! | Symmetric key      | `algorithm`                | `AES`                     |
//! | Document           | `type`                     | from the ID, then `*`     |
//! | TED                | `algorithm` / text prefix  | `base64`                  |
//! | PNF                | single slot                | n/a                       |
//!
//! Digesters sit in a registry of their own, keyed by algorithm name. The
//! address factories take theirs when built; after overriding a digester,
//! call [`Registries::install_address_factories`] to rebuild them.
//!
//! ## Concurrency
//!
//! Each [`FactoryRegistry`] guards its table with a `parking_lot::RwLock`.
//! Lookups clone the `Arc` out and drop the lock before the factory runs,
//! so factories may call back into the registries freely.
//!
//! ## Sharing
//!
//! [`Registries::shared`] is a process-wide instance with the built-in
//! factories installed. Independent instances can be built with
//! [`Registries::with_defaults`] and passed explicitly; tests do this to
//! override factories without affecting each other.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use url::Url;

use crate::config::{
    ADDRESS_BTC, ADDRESS_ETH, ALGORITHM_AES, ALGORITHM_ED25519, ALGORITHM_PLAIN,
    ALGORITHM_X25519, DEFAULT_ENCODING, DEFAULT_KEY_ALGORITHM, DEFAULT_META_TYPE,
    DEFAULT_SYMMETRIC_ALGORITHM, DIGEST_KECCAK256, DIGEST_RIPEMD160, DIGEST_SHA256,
    DOCUMENT_ANY, DOCUMENT_BULLETIN, DOCUMENT_PROFILE, DOCUMENT_VISA, ENCODING_BASE58,
    ENCODING_BASE64, ENCODING_HEX,
};
use crate::crypto::aes::AesKeyFactory;
use crate::crypto::ed25519::Ed25519KeyFactory;
use crate::crypto::plain::PlainKeyFactory;
use crate::crypto::x25519::X25519KeyFactory;
use crate::crypto::{
    Digester, Keccak256Digester, PrivateKey, PrivateKeyFactory, PublicKey, PublicKeyFactory,
    Ripemd160Digester, Sha256Digester, SymmetricKey, SymmetricKeyFactory,
};
use crate::document::{Document, DocumentFactory, GeneralDocumentFactory};
use crate::format::{
    Base58Coder, Base64Coder, BaseFileFactory, EncodedDataFactory, HexCoder,
    PortableNetworkFile, PortableNetworkFileFactory, TedText, TransportableData,
    TransportableDataFactory,
};
use crate::identity::{
    normalize_meta_type, Address, AddressFactory, BtcAddressFactory, DefaultMetaFactory,
    EthAddressFactory, GeneralIdFactory, Id, IdFactory, Meta, MetaFactory, MetaType,
};

// ---------------------------------------------------------------------------
// FactoryRegistry
// ---------------------------------------------------------------------------

/// A tag -> factory table for one concern.
pub struct FactoryRegistry<F: ?Sized> {
    concern: &'static str,
    factories: RwLock<HashMap<String, Arc<F>>>,
}

impl<F: ?Sized> FactoryRegistry<F> {
    pub fn new(concern: &'static str) -> Self {
        Self {
            concern,
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Install `factory` under `tag`. The last registration wins.
    pub fn register(&self, tag: impl Into<String>, factory: Arc<F>) {
        let tag = tag.into();
        let replaced = self.factories.write().insert(tag.clone(), factory).is_some();
        if replaced {
            debug!(concern = self.concern, tag = %tag, "factory replaced");
        } else {
            debug!(concern = self.concern, tag = %tag, "factory registered");
        }
    }

    /// The factory for `tag`, if any.
    pub fn lookup(&self, tag: &str) -> Option<Arc<F>> {
        self.factories.read().get(tag).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.read().contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.factories.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Snapshot of every `(tag, factory)` pair, sorted by tag.
    pub fn entries(&self) -> Vec<(String, Arc<F>)> {
        let mut entries: Vec<(String, Arc<F>)> = self
            .factories
            .read()
            .iter()
            .map(|(tag, factory)| (tag.clone(), Arc::clone(factory)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn lookup_or_log(&self, tag: &str) -> Option<Arc<F>> {
        let factory = self.lookup(tag);
        if factory.is_none() {
            debug!(concern = self.concern, tag, "no factory registered");
        }
        factory
    }
}

impl<F: ?Sized> fmt::Debug for FactoryRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("concern", &self.concern)
            .field("tags", &self.tags())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

/// All factory tables plus the parse/generate/create facade over them.
pub struct Registries {
    pub metas: FactoryRegistry<dyn MetaFactory>,
    pub addresses: FactoryRegistry<dyn AddressFactory>,
    pub private_keys: FactoryRegistry<dyn PrivateKeyFactory>,
    pub public_keys: FactoryRegistry<dyn PublicKeyFactory>,
    pub symmetric_keys: FactoryRegistry<dyn SymmetricKeyFactory>,
    pub documents: FactoryRegistry<dyn DocumentFactory>,
    pub transportable_data: FactoryRegistry<dyn TransportableDataFactory>,
    pub digesters: FactoryRegistry<dyn Digester>,
    id_factory: RwLock<Option<Arc<dyn IdFactory>>>,
    file_factory: RwLock<Option<Arc<dyn PortableNetworkFileFactory>>>,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registries")
            .field("metas", &self.metas)
            .field("addresses", &self.addresses)
            .field("private_keys", &self.private_keys)
            .field("public_keys", &self.public_keys)
            .field("symmetric_keys", &self.symmetric_keys)
            .field("documents", &self.documents)
            .field("transportable_data", &self.transportable_data)
            .field("digesters", &self.digesters)
            .field("id_factory", &self.id_factory.read().is_some())
            .field("file_factory", &self.file_factory.read().is_some())
            .finish()
    }
}

impl Registries {
    /// Empty registries: every lookup fails until factories are installed.
    pub fn new() -> Self {
        Self {
            metas: FactoryRegistry::new("meta"),
            addresses: FactoryRegistry::new("address"),
            private_keys: FactoryRegistry::new("private_key"),
            public_keys: FactoryRegistry::new("public_key"),
            symmetric_keys: FactoryRegistry::new("symmetric_key"),
            documents: FactoryRegistry::new("document"),
            transportable_data: FactoryRegistry::new("transportable_data"),
            digesters: FactoryRegistry::new("digester"),
            id_factory: RwLock::new(None),
            file_factory: RwLock::new(None),
        }
    }

    /// Registries with every built-in factory installed.
    pub fn with_defaults() -> Self {
        let registries = Self::new();
        registries.install_defaults();
        registries
    }

    /// The process-wide instance, built on first use.
    pub fn shared() -> &'static Registries {
        static SHARED: OnceLock<Registries> = OnceLock::new();
        SHARED.get_or_init(Registries::with_defaults)
    }

    /// Install (or reinstall) the built-in factories.
    pub fn install_defaults(&self) {
        for meta_type in MetaType::ALL {
            self.metas
                .register(meta_type.tag(), Arc::new(DefaultMetaFactory::new(meta_type)));
        }

        self.digesters.register(DIGEST_SHA256, Arc::new(Sha256Digester));
        self.digesters.register(DIGEST_RIPEMD160, Arc::new(Ripemd160Digester));
        self.digesters.register(DIGEST_KECCAK256, Arc::new(Keccak256Digester));
        self.install_address_factories();
        self.set_id_factory(Arc::new(GeneralIdFactory));

        let ed25519 = Arc::new(Ed25519KeyFactory);
        self.private_keys.register(ALGORITHM_ED25519, ed25519.clone());
        self.public_keys.register(ALGORITHM_ED25519, ed25519);
        let x25519 = Arc::new(X25519KeyFactory);
        self.private_keys.register(ALGORITHM_X25519, x25519.clone());
        self.public_keys.register(ALGORITHM_X25519, x25519);
        self.symmetric_keys.register(ALGORITHM_AES, Arc::new(AesKeyFactory));
        self.symmetric_keys.register(ALGORITHM_PLAIN, Arc::new(PlainKeyFactory));

        let general = Arc::new(GeneralDocumentFactory);
        for doc_type in [DOCUMENT_ANY, DOCUMENT_VISA, DOCUMENT_PROFILE, DOCUMENT_BULLETIN] {
            self.documents.register(doc_type, general.clone());
        }

        self.transportable_data.register(
            ENCODING_BASE64,
            Arc::new(EncodedDataFactory::new(Arc::new(Base64Coder))),
        );
        self.transportable_data.register(
            ENCODING_BASE58,
            Arc::new(EncodedDataFactory::new(Arc::new(Base58Coder))),
        );
        self.transportable_data.register(
            ENCODING_HEX,
            Arc::new(EncodedDataFactory::new(Arc::new(HexCoder))),
        );

        self.set_file_factory(Arc::new(BaseFileFactory));
    }

    /// Build the BTC and ETH address factories from the registered
    /// digesters, falling back to the built-in ones for missing tags.
    pub fn install_address_factories(&self) {
        let sha256 = self.digester_or(DIGEST_SHA256, Sha256Digester);
        let ripemd160 = self.digester_or(DIGEST_RIPEMD160, Ripemd160Digester);
        let keccak256 = self.digester_or(DIGEST_KECCAK256, Keccak256Digester);
        self.addresses
            .register(ADDRESS_BTC, Arc::new(BtcAddressFactory::new(sha256, ripemd160)));
        self.addresses
            .register(ADDRESS_ETH, Arc::new(EthAddressFactory::new(keccak256)));
    }

    fn digester_or(&self, algorithm: &str, fallback: impl Digester + 'static) -> Arc<dyn Digester> {
        match self.digesters.lookup(algorithm) {
            Some(digester) => digester,
            None => Arc::new(fallback),
        }
    }

    // -- defaults -----------------------------------------------------------

    /// Meta type tag of a meta map.
    pub fn meta_type(meta: &Map<String, Value>) -> String {
        meta.get("type")
            .or_else(|| meta.get("version"))
            .and_then(normalize_meta_type)
            .unwrap_or_else(|| DEFAULT_META_TYPE.to_string())
    }

    /// Algorithm of an asymmetric key map.
    pub fn key_algorithm(key: &Map<String, Value>) -> &str {
        key.get("algorithm")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_KEY_ALGORITHM)
    }

    /// Algorithm of a symmetric key map.
    pub fn symmetric_key_algorithm(key: &Map<String, Value>) -> &str {
        key.get("algorithm")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SYMMETRIC_ALGORITHM)
    }

    /// Encoding of a TED map.
    pub fn ted_algorithm(ted: &Map<String, Value>) -> &str {
        ted.get("algorithm")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ENCODING)
    }

    /// Document type of a document map: its `type`, or a guess from the
    /// owner (users publish visas, groups publish bulletins).
    pub fn document_type(doc: &Map<String, Value>, owner: &Id) -> String {
        if let Some(doc_type) = doc.get("type").and_then(Value::as_str) {
            return doc_type.to_string();
        }
        if owner.is_group() {
            DOCUMENT_BULLETIN.to_string()
        } else {
            DOCUMENT_VISA.to_string()
        }
    }

    /// Owner ID string of a document map (`did`, or legacy `ID`).
    pub fn document_owner(doc: &Map<String, Value>) -> Option<&str> {
        doc.get("did")
            .or_else(|| doc.get("ID"))
            .and_then(Value::as_str)
    }

    // -- meta ---------------------------------------------------------------

    fn meta_factory(&self, meta_type: &str) -> Option<Arc<dyn MetaFactory>> {
        let tag = MetaType::from_tag(meta_type).map_or(meta_type, |t| t.tag());
        self.metas.lookup_or_log(tag)
    }

    pub fn generate_meta(
        &self,
        meta_type: &str,
        private_key: &dyn PrivateKey,
        seed: Option<&str>,
    ) -> Option<Meta> {
        self.meta_factory(meta_type)?
            .generate_meta(private_key, seed)
    }

    pub fn create_meta(
        &self,
        meta_type: &str,
        public_key: Arc<dyn PublicKey>,
        seed: Option<String>,
        fingerprint: Option<TransportableData>,
    ) -> Option<Meta> {
        self.meta_factory(meta_type)?
            .create_meta(public_key, seed, fingerprint)
    }

    pub fn parse_meta(&self, meta: &Value) -> Option<Meta> {
        let map = meta.as_object()?;
        let meta_type = Self::meta_type(map);
        self.meta_factory(&meta_type)?.parse_meta(map, self)
    }

    // -- address / id -------------------------------------------------------

    /// Broadcast literals first, then every address factory in tag order.
    pub fn parse_address(&self, address: &str) -> Option<Address> {
        if let Some(broadcast) = Address::parse_broadcast(address) {
            return Some(broadcast);
        }
        let parsed = self
            .addresses
            .entries()
            .into_iter()
            .find_map(|(_, factory)| factory.parse_address(address));
        if parsed.is_none() {
            debug!(address, "unrecognized address");
        }
        parsed
    }

    /// Encode `meta`'s payload with the factory registered under its
    /// address type. `None` for an invalid meta.
    pub fn generate_address(&self, meta: &Meta, network: u8) -> Option<Address> {
        if !meta.is_valid() {
            debug!(meta_type = meta.meta_type(), "invalid meta has no address");
            return None;
        }
        let factory = self.addresses.lookup_or_log(meta.address_type())?;
        Some(factory.generate_address(meta.payload()?, network))
    }

    pub fn set_id_factory(&self, factory: Arc<dyn IdFactory>) {
        if self.id_factory.write().replace(factory).is_some() {
            debug!("ID factory replaced");
        }
    }

    pub fn id_factory(&self) -> Option<Arc<dyn IdFactory>> {
        let factory = self.id_factory.read().clone();
        if factory.is_none() {
            warn!("no ID factory installed");
        }
        factory
    }

    pub fn parse_id(&self, id: &str) -> Option<Id> {
        self.id_factory()?.parse_id(id, self)
    }

    pub fn create_id(
        &self,
        name: Option<String>,
        address: Address,
        terminal: Option<String>,
    ) -> Option<Id> {
        Some(self.id_factory()?.create_id(name, address, terminal))
    }

    /// `meta`'s ID on `network`, named after its seed.
    pub fn generate_id(&self, meta: &Meta, network: u8, terminal: Option<String>) -> Option<Id> {
        let address = self.generate_address(meta, network)?;
        self.create_id(meta.seed().map(str::to_owned), address, terminal)
    }

    /// `true` when `id` is the ID `meta` generates on `id`'s network.
    pub fn match_id(&self, meta: &Meta, id: &Id) -> bool {
        if id.name() != meta.seed() {
            return false;
        }
        self.generate_address(meta, id.network())
            .is_some_and(|address| &address == id.address())
    }

    /// Parse a list of ID strings, skipping anything unparsable.
    pub fn convert_id_list(&self, values: &[Value]) -> Vec<Id> {
        values
            .iter()
            .filter_map(|value| self.parse_id(value.as_str()?))
            .collect()
    }

    pub fn revert_id_list(ids: &[Id]) -> Vec<Value> {
        ids.iter().map(|id| Value::String(id.to_string())).collect()
    }

    // -- keys ---------------------------------------------------------------

    pub fn generate_private_key(&self, algorithm: &str) -> Option<Arc<dyn PrivateKey>> {
        Some(self.private_keys.lookup_or_log(algorithm)?.generate_private_key())
    }

    pub fn parse_private_key(&self, key: &Value) -> Option<Arc<dyn PrivateKey>> {
        let map = key.as_object()?;
        self.private_keys
            .lookup_or_log(Self::key_algorithm(map))?
            .parse_private_key(map, self)
    }

    pub fn parse_public_key(&self, key: &Value) -> Option<Arc<dyn PublicKey>> {
        let map = key.as_object()?;
        self.public_keys
            .lookup_or_log(Self::key_algorithm(map))?
            .parse_public_key(map, self)
    }

    pub fn generate_symmetric_key(&self, algorithm: &str) -> Option<Arc<dyn SymmetricKey>> {
        Some(
            self.symmetric_keys
                .lookup_or_log(algorithm)?
                .generate_symmetric_key(),
        )
    }

    pub fn parse_symmetric_key(&self, key: &Value) -> Option<Arc<dyn SymmetricKey>> {
        let map = key.as_object()?;
        self.symmetric_keys
            .lookup_or_log(Self::symmetric_key_algorithm(map))?
            .parse_symmetric_key(map, self)
    }

    // -- transportable data -------------------------------------------------

    pub fn create_transportable_data(
        &self,
        algorithm: &str,
        data: Vec<u8>,
    ) -> Option<TransportableData> {
        Some(
            self.transportable_data
                .lookup_or_log(algorithm)?
                .create_transportable_data(data),
        )
    }

    /// Parse any TED form: bare string, `alg,text`, data URL, or map.
    pub fn parse_transportable_data(&self, ted: &Value) -> Option<TransportableData> {
        let map = match ted {
            Value::String(text) => match TedText::split(text) {
                Ok(parts) => parts.to_map(),
                Err(e) => {
                    debug!(error = %e, "rejected transportable data");
                    return None;
                }
            },
            Value::Object(map) => map.clone(),
            _ => return None,
        };
        self.transportable_data
            .lookup_or_log(Self::ted_algorithm(&map))?
            .parse_transportable_data(&map)
    }

    /// Decode a TED value straight to bytes.
    pub fn decode_data(&self, ted: Option<&Value>) -> Option<Vec<u8>> {
        self.parse_transportable_data(ted?).map(TransportableData::into_data)
    }

    // -- digesters ----------------------------------------------------------

    /// Hash `data` with the digester registered for `algorithm`.
    pub fn digest(&self, algorithm: &str, data: &[u8]) -> Option<Vec<u8>> {
        Some(self.digesters.lookup_or_log(algorithm)?.digest(data))
    }

    // -- portable network files ---------------------------------------------

    pub fn set_file_factory(&self, factory: Arc<dyn PortableNetworkFileFactory>) {
        if self.file_factory.write().replace(factory).is_some() {
            debug!("file factory replaced");
        }
    }

    pub fn file_factory(&self) -> Option<Arc<dyn PortableNetworkFileFactory>> {
        let factory = self.file_factory.read().clone();
        if factory.is_none() {
            warn!("no file factory installed");
        }
        factory
    }

    pub fn create_portable_network_file(
        &self,
        data: Option<TransportableData>,
        filename: Option<String>,
        url: Option<Url>,
        password: Option<Arc<dyn SymmetricKey>>,
    ) -> Option<PortableNetworkFile> {
        Some(
            self.file_factory()?
                .create_portable_network_file(data, filename, url, password),
        )
    }

    /// Parse a PNF: a map, a bare URL, or a bare TED string.
    pub fn parse_portable_network_file(&self, pnf: &Value) -> Option<PortableNetworkFile> {
        let map = match pnf {
            Value::Object(map) => map.clone(),
            Value::String(text) => {
                let mut map = Map::new();
                let is_url = !text.starts_with("data:") && Url::parse(text).is_ok();
                let field = if is_url { "URL" } else { "data" };
                map.insert(field.into(), Value::String(text.clone()));
                map
            }
            _ => return None,
        };
        self.file_factory()?.parse_portable_network_file(&map, self)
    }

    // -- documents ----------------------------------------------------------

    fn document_factory(&self, doc_type: &str) -> Option<Arc<dyn DocumentFactory>> {
        self.documents
            .lookup(doc_type)
            .or_else(|| self.documents.lookup_or_log(DOCUMENT_ANY))
    }

    pub fn create_document(
        &self,
        doc_type: &str,
        id: Id,
        data: Option<String>,
        signature: Option<TransportableData>,
    ) -> Option<Document> {
        self.document_factory(doc_type)?
            .create_document(doc_type, id, data, signature)
    }

    pub fn parse_document(&self, doc: &Value) -> Option<Document> {
        let map = doc.as_object()?;
        let owner = self.parse_id(Self::document_owner(map)?)?;
        let doc_type = Self::document_type(map, &owner);
        self.document_factory(&doc_type)?
            .parse_document(&doc_type, map, self)
    }

    /// Parse a list of documents, skipping anything unparsable.
    pub fn convert_documents(&self, values: &[Value]) -> Vec<Document> {
        values
            .iter()
            .filter_map(|value| self.parse_document(value))
            .collect()
    }

    pub fn revert_documents(docs: &[Document]) -> Vec<Value> {
        docs.iter().map(Document::to_value).collect()
    }
}
