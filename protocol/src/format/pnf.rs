//! # Portable Network File (PNF)
//!
//! A file reference small enough to embed in a document: either the bytes
//! themselves (as TED) or a download URL, plus the symmetric key needed to
//! decrypt them. Visas use PNFs for avatars.
//!
//! Wire form: `{ "data"?, "filename"?, "URL"?, "key"? }`. A PNF carrying only
//! a URL collapses to the bare URL string; one carrying only data collapses
//! to the TED string.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::ted::TransportableData;
use crate::crypto::{CryptographyKey, DecryptKey, EncryptKey, SymmetricKey};
use crate::registry::Registries;

#[derive(Clone, Debug, Default)]
pub struct PortableNetworkFile {
    data: Option<TransportableData>,
    filename: Option<String>,
    url: Option<Url>,
    password: Option<Arc<dyn SymmetricKey>>,
    extra: Map<String, Value>,
}

impl PortableNetworkFile {
    /// An embedded file.
    pub fn from_data(data: TransportableData, filename: Option<String>) -> Self {
        Self {
            data: Some(data),
            filename,
            ..Self::default()
        }
    }

    /// A remote file, optionally encrypted with `password`.
    pub fn from_url(url: Url, password: Option<Arc<dyn SymmetricKey>>) -> Self {
        Self {
            url: Some(url),
            password,
            ..Self::default()
        }
    }

    /// Encrypt `plaintext` with `password` and embed the ciphertext.
    pub fn encrypted(
        plaintext: &[u8],
        password: Arc<dyn SymmetricKey>,
        filename: Option<String>,
    ) -> Option<Self> {
        let ciphertext = password.encrypt(plaintext)?;
        Some(Self {
            data: Some(TransportableData::base64(ciphertext)),
            filename,
            password: Some(password),
            ..Self::default()
        })
    }

    pub fn data(&self) -> Option<&TransportableData> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Option<TransportableData>) {
        self.data = data;
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: Option<String>) {
        self.filename = filename;
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn set_url(&mut self, url: Option<Url>) {
        self.url = url;
    }

    pub fn password(&self) -> Option<&Arc<dyn SymmetricKey>> {
        self.password.as_ref()
    }

    pub fn set_password(&mut self, password: Option<Arc<dyn SymmetricKey>>) {
        self.password = password;
    }

    /// The embedded bytes, decrypted with the password when one is set.
    pub fn plaintext(&self) -> Option<Vec<u8>> {
        let data = self.data.as_ref()?;
        match &self.password {
            Some(password) => password.decrypt(data.data()),
            None => Some(data.data().to_vec()),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        if let Some(data) = &self.data {
            map.insert("data".into(), data.to_value());
        }
        if let Some(filename) = &self.filename {
            map.insert("filename".into(), Value::String(filename.clone()));
        }
        if let Some(url) = &self.url {
            map.insert("URL".into(), Value::String(url.to_string()));
        }
        if let Some(password) = &self.password {
            map.insert("key".into(), Value::Object(password.to_map()));
        }
        map
    }

    /// Wire value, collapsed to a bare string where nothing would be lost.
    pub fn to_value(&self) -> Value {
        let bare = self.filename.is_none() && self.password.is_none() && self.extra.is_empty();
        match (&self.data, &self.url) {
            (None, Some(url)) if bare => Value::String(url.to_string()),
            (Some(data), None) if bare => data.to_value(),
            _ => Value::Object(self.to_map()),
        }
    }
}

pub trait PortableNetworkFileFactory: Send + Sync {
    fn create_portable_network_file(
        &self,
        data: Option<TransportableData>,
        filename: Option<String>,
        url: Option<Url>,
        password: Option<Arc<dyn SymmetricKey>>,
    ) -> PortableNetworkFile;

    fn parse_portable_network_file(
        &self,
        pnf: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<PortableNetworkFile>;
}

#[derive(Debug, Default)]
pub struct BaseFileFactory;

impl PortableNetworkFileFactory for BaseFileFactory {
    fn create_portable_network_file(
        &self,
        data: Option<TransportableData>,
        filename: Option<String>,
        url: Option<Url>,
        password: Option<Arc<dyn SymmetricKey>>,
    ) -> PortableNetworkFile {
        PortableNetworkFile {
            data,
            filename,
            url,
            password,
            extra: Map::new(),
        }
    }

    fn parse_portable_network_file(
        &self,
        pnf: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<PortableNetworkFile> {
        let data = match pnf.get("data") {
            Some(value) => Some(registries.parse_transportable_data(value)?),
            None => None,
        };
        let url = match pnf.get("URL").and_then(Value::as_str) {
            Some(text) => match Url::parse(text) {
                Ok(url) => Some(url),
                Err(e) => {
                    debug!(error = %e, "rejected file URL");
                    return None;
                }
            },
            None => None,
        };
        if data.is_none() && url.is_none() {
            return None;
        }
        let password = match pnf.get("key") {
            Some(value) => Some(registries.parse_symmetric_key(value)?),
            None => None,
        };
        let filename = pnf
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let mut extra = pnf.clone();
        for field in ["data", "filename", "URL", "key"] {
            extra.remove(field);
        }
        Some(PortableNetworkFile {
            data,
            filename,
            url,
            password,
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesKey;
    use serde_json::json;

    #[test]
    fn url_only_collapses_to_string() {
        let url = Url::parse("https://cdn.example.com/avatar.png").unwrap();
        let pnf = PortableNetworkFile::from_url(url, None);
        assert_eq!(pnf.to_value(), json!("https://cdn.example.com/avatar.png"));
    }

    #[test]
    fn data_only_collapses_to_ted() {
        let pnf = PortableNetworkFile::from_data(TransportableData::base64(vec![1, 2, 3]), None);
        assert_eq!(pnf.to_value(), json!("AQID"));
    }

    #[test]
    fn filename_forces_map_form() {
        let pnf = PortableNetworkFile::from_data(
            TransportableData::base64(vec![1, 2, 3]),
            Some("a.bin".into()),
        );
        assert_eq!(pnf.to_value(), json!({ "data": "AQID", "filename": "a.bin" }));
    }

    #[test]
    fn encrypted_file_roundtrip() {
        let password: Arc<dyn SymmetricKey> = Arc::new(AesKey::generate());
        let pnf = PortableNetworkFile::encrypted(b"avatar bytes", password, None).unwrap();
        assert_ne!(pnf.data().unwrap().data(), b"avatar bytes");
        assert_eq!(pnf.plaintext().unwrap(), b"avatar bytes");

        let registries = Registries::with_defaults();
        let parsed = registries.parse_portable_network_file(&pnf.to_value()).unwrap();
        assert_eq!(parsed.plaintext().unwrap(), b"avatar bytes");
    }

    #[test]
    fn parse_requires_data_or_url() {
        let registries = Registries::with_defaults();
        assert!(registries
            .parse_portable_network_file(&json!({ "filename": "a.bin" }))
            .is_none());
    }
}
