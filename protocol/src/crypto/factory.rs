//! Key factory seams.
//!
//! One factory per algorithm tag, registered in [`Registries`]. A factory
//! that parses a key map receives the registries so it can decode the
//! `data` field through whatever TED coders are installed.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::keys::{PrivateKey, PublicKey, SymmetricKey};
use crate::registry::Registries;

pub trait PrivateKeyFactory: Send + Sync {
    fn generate_private_key(&self) -> Arc<dyn PrivateKey>;

    fn parse_private_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PrivateKey>>;
}

pub trait PublicKeyFactory: Send + Sync {
    fn parse_public_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn PublicKey>>;
}

pub trait SymmetricKeyFactory: Send + Sync {
    fn generate_symmetric_key(&self) -> Arc<dyn SymmetricKey>;

    fn parse_symmetric_key(
        &self,
        key: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Arc<dyn SymmetricKey>>;
}
