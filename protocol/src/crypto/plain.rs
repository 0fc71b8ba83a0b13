//! Pass-through symmetric key.
//!
//! The default password of a PNF: files that were uploaded unencrypted
//! still "decrypt" through the same code path.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::factory::SymmetricKeyFactory;
use super::keys::{CryptographyKey, DecryptKey, EncryptKey, SymmetricKey};
use crate::config::ALGORITHM_PLAIN;
use crate::registry::Registries;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainKey;

impl CryptographyKey for PlainKey {
    fn algorithm(&self) -> &str {
        ALGORITHM_PLAIN
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("algorithm".into(), Value::String(ALGORITHM_PLAIN.into()));
        map
    }
}

impl EncryptKey for PlainKey {
    fn encrypt(&self, plaintext: &[u8]) -> Option<Vec<u8>> {
        Some(plaintext.to_vec())
    }
}

impl DecryptKey for PlainKey {
    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        Some(ciphertext.to_vec())
    }
}

impl SymmetricKey for PlainKey {}

#[derive(Debug, Default)]
pub struct PlainKeyFactory;

impl SymmetricKeyFactory for PlainKeyFactory {
    fn generate_symmetric_key(&self) -> Arc<dyn SymmetricKey> {
        Arc::new(PlainKey)
    }

    fn parse_symmetric_key(
        &self,
        _key: &Map<String, Value>,
        _registries: &Registries,
    ) -> Option<Arc<dyn SymmetricKey>> {
        Some(Arc::new(PlainKey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_key_is_identity() {
        let ct = PlainKey.encrypt(b"hello").unwrap();
        assert_eq!(ct, b"hello");
        assert_eq!(PlainKey.decrypt(&ct).unwrap(), b"hello");
    }

    #[test]
    fn map_has_no_data() {
        let map = PlainKey.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["algorithm"], "PLAIN");
    }
}
