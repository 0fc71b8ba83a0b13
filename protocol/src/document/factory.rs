//! Document factory seam.
//!
//! Factories are keyed by document type. The `*` factory catches every type
//! nobody registered specifically, so it must honor whatever type it is
//! asked to build.

use serde_json::{Map, Value};
use tracing::debug;

use super::tai::Document;
use crate::format::TransportableData;
use crate::identity::Id;
use crate::registry::Registries;

pub trait DocumentFactory: Send + Sync {
    /// Build a document. `data` and `signature` come as a pair; passing
    /// only one of them yields `None`.
    fn create_document(
        &self,
        doc_type: &str,
        id: Id,
        data: Option<String>,
        signature: Option<TransportableData>,
    ) -> Option<Document>;

    /// Decode the wire map. `doc_type` has already been resolved by the
    /// caller.
    fn parse_document(
        &self,
        doc_type: &str,
        doc: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Document>;
}

#[derive(Debug, Default)]
pub struct GeneralDocumentFactory;

impl DocumentFactory for GeneralDocumentFactory {
    fn create_document(
        &self,
        doc_type: &str,
        id: Id,
        data: Option<String>,
        signature: Option<TransportableData>,
    ) -> Option<Document> {
        match (data, signature) {
            (Some(data), Some(signature)) => {
                Some(Document::with_signature(doc_type, id, data, signature))
            }
            (None, None) => Some(Document::new(doc_type, id)),
            _ => {
                debug!(%id, doc_type, "document has data or signature but not both");
                None
            }
        }
    }

    fn parse_document(
        &self,
        doc_type: &str,
        doc: &Map<String, Value>,
        registries: &Registries,
    ) -> Option<Document> {
        let id = Registries::document_owner(doc)
            .and_then(|did| registries.parse_id(did))?;
        let data = doc.get("data").and_then(Value::as_str).map(str::to_owned);
        let signature = match doc.get("signature") {
            Some(value) => Some(registries.parse_transportable_data(value)?),
            None => None,
        };

        let mut extra = doc.clone();
        for field in ["did", "ID", "type", "data", "signature"] {
            extra.remove(field);
        }
        Some(
            self.create_document(doc_type, id, data, signature)?
                .with_extra(extra),
        )
    }
}
