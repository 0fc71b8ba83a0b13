//! User visa: the public card a user hands out.
//!
//! Carries the key peers should encrypt to (the meta key only signs), the
//! terminal the user is currently reachable at, and an avatar.

use serde_json::Value;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::tai::Document;
use crate::config::DOCUMENT_VISA;
use crate::crypto::{CryptographyKey, PublicKey};
use crate::format::PortableNetworkFile;
use crate::identity::Id;
use crate::registry::Registries;

const PROPERTY_TERMINAL: &str = "terminal";
const PROPERTY_KEY: &str = "key";
const PROPERTY_AVATAR: &str = "avatar";

#[derive(Clone, Debug)]
pub struct Visa(Document);

impl Visa {
    pub fn new(id: Id) -> Self {
        Self(Document::new(DOCUMENT_VISA, id))
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    pub fn terminal(&self) -> Option<&str> {
        self.property(PROPERTY_TERMINAL).and_then(Value::as_str)
    }

    pub fn set_terminal(&mut self, terminal: Option<&str>) {
        self.set_property(PROPERTY_TERMINAL, terminal.map_or(Value::Null, Value::from));
    }

    /// The advertised encryption key. Keys that cannot encrypt are ignored.
    pub fn public_key(&self, registries: &Registries) -> Option<Arc<dyn PublicKey>> {
        let key = registries.parse_public_key(self.property(PROPERTY_KEY)?)?;
        if key.as_encrypt_key().is_none() {
            return None;
        }
        Some(key)
    }

    pub fn set_public_key<K>(&mut self, key: Option<&K>)
    where
        K: PublicKey + ?Sized,
    {
        let value = key.map_or(Value::Null, |k| Value::Object(k.to_map()));
        self.set_property(PROPERTY_KEY, value);
    }

    pub fn avatar(&self, registries: &Registries) -> Option<PortableNetworkFile> {
        registries.parse_portable_network_file(self.property(PROPERTY_AVATAR)?)
    }

    pub fn set_avatar(&mut self, avatar: Option<&PortableNetworkFile>) {
        self.set_property(
            PROPERTY_AVATAR,
            avatar.map_or(Value::Null, PortableNetworkFile::to_value),
        );
    }
}

impl Deref for Visa {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.0
    }
}

impl DerefMut for Visa {
    fn deref_mut(&mut self) -> &mut Document {
        &mut self.0
    }
}

impl From<Visa> for Document {
    fn from(visa: Visa) -> Self {
        visa.0
    }
}

impl TryFrom<Document> for Visa {
    type Error = Document;

    /// Accepts only documents of type `visa`; hands anything else back.
    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        if doc.doc_type() == DOCUMENT_VISA {
            Ok(Self(doc))
        } else {
            Err(doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519PrivateKey, PrivateKey, X25519PrivateKey};
    use url::Url;

    #[test]
    fn encryption_key_roundtrip() {
        let registries = Registries::with_defaults();
        let x = X25519PrivateKey::generate();
        let mut visa = Visa::new(Id::anyone().clone());
        visa.set_public_key(Some(x.public_key().as_ref()));
        let key = visa.public_key(&registries).unwrap();
        assert_eq!(key.algorithm(), "X25519");
        assert_eq!(key.data(), x.public_key().data());
    }

    #[test]
    fn signing_key_is_not_an_encryption_key() {
        let registries = Registries::with_defaults();
        let ed = Ed25519PrivateKey::generate();
        let mut visa = Visa::new(Id::anyone().clone());
        visa.set_public_key(Some(ed.public_key().as_ref()));
        assert!(visa.public_key(&registries).is_none());
    }

    #[test]
    fn terminal_and_avatar() {
        let registries = Registries::with_defaults();
        let mut visa = Visa::new(Id::anyone().clone());
        visa.set_terminal(Some("phone"));
        let url = Url::parse("https://cdn.example.com/moky.png").unwrap();
        visa.set_avatar(Some(&PortableNetworkFile::from_url(url.clone(), None)));

        assert_eq!(visa.terminal(), Some("phone"));
        assert_eq!(visa.avatar(&registries).unwrap().url(), Some(&url));

        visa.set_terminal(None);
        assert_eq!(visa.terminal(), None);
    }

    #[test]
    fn view_signs_through_document() {
        let sk = Ed25519PrivateKey::generate();
        let mut visa = Visa::new(Id::anyone().clone());
        visa.set_terminal(Some("phone"));
        visa.sign(&sk).unwrap();
        assert!(visa.is_valid());

        let doc: Document = visa.into();
        assert!(Visa::try_from(doc).is_ok());
        assert!(Visa::try_from(Document::new("bulletin", Id::everyone().clone())).is_err());
    }
}
