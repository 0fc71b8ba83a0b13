//! Group bulletin: who founded the group and who helps run it.

use serde_json::Value;
use std::ops::{Deref, DerefMut};

use super::tai::Document;
use crate::config::DOCUMENT_BULLETIN;
use crate::identity::Id;
use crate::registry::Registries;

const PROPERTY_FOUNDER: &str = "founder";
const PROPERTY_ASSISTANTS: &str = "assistants";

#[derive(Clone, Debug)]
pub struct Bulletin(Document);

impl Bulletin {
    pub fn new(id: Id) -> Self {
        Self(Document::new(DOCUMENT_BULLETIN, id))
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    pub fn founder(&self, registries: &Registries) -> Option<Id> {
        registries.parse_id(self.property(PROPERTY_FOUNDER)?.as_str()?)
    }

    pub fn set_founder(&mut self, founder: Option<&Id>) {
        let value = founder.map_or(Value::Null, |id| Value::String(id.to_string()));
        self.set_property(PROPERTY_FOUNDER, value);
    }

    /// Assistant bots. Unparsable entries are skipped.
    pub fn assistants(&self, registries: &Registries) -> Vec<Id> {
        match self.property(PROPERTY_ASSISTANTS) {
            Some(Value::Array(values)) => registries.convert_id_list(values),
            _ => Vec::new(),
        }
    }

    /// An empty list removes the property.
    pub fn set_assistants(&mut self, assistants: &[Id]) {
        let value = if assistants.is_empty() {
            Value::Null
        } else {
            Value::Array(Registries::revert_id_list(assistants))
        };
        self.set_property(PROPERTY_ASSISTANTS, value);
    }
}

impl Deref for Bulletin {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.0
    }
}

impl DerefMut for Bulletin {
    fn deref_mut(&mut self) -> &mut Document {
        &mut self.0
    }
}

impl From<Bulletin> for Document {
    fn from(bulletin: Bulletin) -> Self {
        bulletin.0
    }
}

impl TryFrom<Document> for Bulletin {
    type Error = Document;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        if doc.doc_type() == DOCUMENT_BULLETIN {
            Ok(Self(doc))
        } else {
            Err(doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn founder_and_assistants() {
        let registries = Registries::with_defaults();
        let mut bulletin = Bulletin::new(Id::everyone().clone());
        bulletin.set_founder(Some(Id::founder()));
        bulletin.set_assistants(&[Id::anyone().clone(), Id::founder().clone()]);

        assert_eq!(bulletin.founder(&registries).as_ref(), Some(Id::founder()));
        assert_eq!(bulletin.assistants(&registries).len(), 2);

        bulletin.set_assistants(&[]);
        assert!(bulletin.property("assistants").is_none());
    }

    #[test]
    fn bad_assistant_entries_skipped() {
        let registries = Registries::with_defaults();
        let mut bulletin = Bulletin::new(Id::everyone().clone());
        bulletin.set_property("assistants", json!(["anyone@anywhere", "moky@", 42]));
        assert_eq!(bulletin.assistants(&registries), vec![Id::anyone().clone()]);
    }
}
