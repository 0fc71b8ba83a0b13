//! End-to-end integration tests for the MKM identity core.
//!
//! These tests walk the whole identity lifecycle through the public API:
//! key generation, meta creation, ID derivation, JSON transport, document
//! signing, and verification by a peer that only ever sees JSON. They prove
//! that the crypto, format, identity, document and registry layers compose.
//!
//! Each test builds its own `Registries` unless it is specifically about
//! the shared instance. No shared state, no ordering dependencies.

use serde_json::{json, Value};
use std::sync::Arc;

use mkm_protocol::config::{
    ADDRESS_BTC, ENTITY_BOT, ENTITY_GROUP, ENTITY_STATION, ENTITY_USER,
};
use mkm_protocol::crypto::{
    match_key_pair, CryptographyKey, DecryptKey, Ed25519PrivateKey, EncryptKey, Keccak256Digester,
    PrivateKey, PublicKey, Ripemd160Digester, X25519PrivateKey,
};
use mkm_protocol::format::{PortableNetworkFile, TransportableData};
use mkm_protocol::identity::{format_search_number, BtcAddressFactory, Meta, MetaFactory};
use mkm_protocol::{Address, Bulletin, Document, Id, Registries, Visa};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A fresh user: private key, MKM meta seeded with `name`, and user ID.
fn new_user(registries: &Registries, name: &str) -> (Ed25519PrivateKey, Meta, Id) {
    let sk = Ed25519PrivateKey::generate();
    let meta = registries.generate_meta("MKM", &sk, Some(name)).unwrap();
    let id = registries.generate_id(&meta, ENTITY_USER, None).unwrap();
    (sk, meta, id)
}

/// Serialize to JSON text and back, the way a peer would receive it.
fn over_the_wire(value: &Value) -> Value {
    let text = serde_json::to_string(value).unwrap();
    serde_json::from_str(&text).unwrap()
}

// ---------------------------------------------------------------------------
// 1. Meta -> ID Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn mkm_meta_lifecycle() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");

    assert_eq!(id.name(), Some("moky"));
    assert!(id.is_user() && !id.is_broadcast());
    assert!(meta.is_valid());
    assert!(meta.match_id(&id));
    assert!(meta.match_public_key(sk.public_key().as_ref()));

    // The meta survives JSON transport unchanged and still valid.
    let received = registries.parse_meta(&over_the_wire(&meta.to_value())).unwrap();
    assert_eq!(received, meta);
    assert!(received.is_valid());
    assert!(received.match_id(&id));

    // So does the ID.
    let parsed = registries.parse_id(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
    assert_eq!(parsed.network(), ENTITY_USER);
}

#[test]
fn every_meta_type_round_trips() {
    let registries = Registries::with_defaults();
    let sk = Ed25519PrivateKey::generate();

    for (meta_type, network) in [
        ("1", ENTITY_USER),
        ("2", ENTITY_GROUP),
        ("3", ENTITY_STATION),
        ("4", ENTITY_USER),
        ("5", ENTITY_BOT),
    ] {
        let meta = registries.generate_meta(meta_type, &sk, Some("moky")).unwrap();
        let id = meta.generate_id(network, Some("terminal-1".into())).unwrap();
        let parsed = registries.parse_id(&id.to_string()).unwrap();

        assert_eq!(parsed, id, "type {meta_type}");
        assert_eq!(parsed.terminal(), Some("terminal-1"));
        assert!(meta.match_id(&parsed), "type {meta_type}");

        let received = registries.parse_meta(&meta.to_value()).unwrap();
        assert_eq!(received, meta, "type {meta_type}");
    }
}

#[test]
fn same_seed_other_key_gives_other_identity() {
    let registries = Registries::with_defaults();
    let (_, meta, id) = new_user(&registries, "moky");
    let (_, imposter_meta, imposter_id) = new_user(&registries, "moky");

    assert_eq!(id.name(), imposter_id.name());
    assert_ne!(id, imposter_id);
    assert!(!imposter_meta.match_id(&id));
    assert!(!meta.match_public_key(imposter_meta.public_key().as_ref()));
}

// ---------------------------------------------------------------------------
// 2. Tampering
// ---------------------------------------------------------------------------

#[test]
fn corrupted_address_rejected() {
    let registries = Registries::with_defaults();
    let (_, _, id) = new_user(&registries, "moky");
    let address = id.address().as_str();

    let last = address.chars().last().unwrap();
    let replacement = if last == 'z' { 'y' } else { 'z' };
    let corrupted = format!("{}{}", &address[..address.len() - 1], replacement);

    assert!(registries.parse_address(&corrupted).is_none());
    assert!(registries.parse_id(&format!("moky@{corrupted}")).is_none());

    // Parse then re-encode is idempotent.
    let reparsed = registries.parse_address(address).unwrap();
    assert_eq!(reparsed.to_string(), address);
    assert!(reparsed.search_number().is_some());
    assert_eq!(
        format_search_number(reparsed.search_number().unwrap()).len(),
        "xxx-xxx-xxxx".len()
    );
}

#[test]
fn tampered_fingerprint_invalidates_meta() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");

    let mut forged = meta.fingerprint().unwrap().data().to_vec();
    forged[10] ^= 0x80;
    let mut map = meta.to_map();
    map.insert(
        "fingerprint".into(),
        TransportableData::base64(forged).to_value(),
    );

    let received = registries.parse_meta(&Value::Object(map)).unwrap();
    assert!(!received.is_valid());
    assert!(!received.match_id(&id));
    assert!(!received.match_public_key(sk.public_key().as_ref()));
    assert!(received.generate_id(ENTITY_USER, None).is_none());
}

#[test]
fn renamed_seed_invalidates_meta() {
    let registries = Registries::with_defaults();
    let (_, meta, _) = new_user(&registries, "moky");
    let mut map = meta.to_map();
    map.insert("seed".into(), json!("hulk"));
    let received = registries.parse_meta(&Value::Object(map)).unwrap();
    assert!(!received.is_valid());
}

// ---------------------------------------------------------------------------
// 3. Documents
// ---------------------------------------------------------------------------

#[test]
fn visa_lifecycle() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");
    let msg_key = X25519PrivateKey::generate();

    // Owner builds and signs a visa.
    let mut visa = Visa::new(id.clone());
    visa.set_name(Some("Albert Moky"));
    visa.set_terminal(Some("laptop"));
    visa.set_public_key(Some(msg_key.public_key().as_ref()));
    let avatar = PortableNetworkFile::from_url(
        url::Url::parse("https://cdn.example.com/moky.jpg").unwrap(),
        None,
    );
    visa.set_avatar(Some(&avatar));
    visa.sign(&sk).unwrap();
    assert!(visa.is_valid());

    // A peer receives meta + visa as JSON and checks them.
    let peer_meta = registries.parse_meta(&over_the_wire(&meta.to_value())).unwrap();
    let doc = registries.parse_document(&over_the_wire(&visa.to_value())).unwrap();
    assert!(peer_meta.match_id(doc.id()));

    let mut peer_visa = Visa::try_from(doc).unwrap();
    assert!(!peer_visa.is_valid());
    assert!(peer_visa.verify(peer_meta.public_key().as_verify_key().unwrap()));
    assert_eq!(peer_visa.name(), Some("Albert Moky"));
    assert_eq!(peer_visa.terminal(), Some("laptop"));
    assert!(peer_visa.time().is_some());
    assert_eq!(
        peer_visa.avatar(&registries).unwrap().url().map(url::Url::as_str),
        Some("https://cdn.example.com/moky.jpg")
    );

    // The peer encrypts to the visa key; only the owner can read it.
    let encrypt_to = peer_visa.public_key(&registries).unwrap();
    let ciphertext = encrypt_to
        .as_encrypt_key()
        .unwrap()
        .encrypt(b"hi moky")
        .unwrap();
    assert_eq!(msg_key.decrypt(&ciphertext).unwrap(), b"hi moky");
}

#[test]
fn document_dirty_clean_cycle() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");
    let verify_key = meta.public_key().as_verify_key().unwrap();

    let mut doc = registries.create_document("visa", id, None, None).unwrap();
    doc.set_property("mood", json!("sunny"));
    assert!(!doc.is_valid());

    doc.sign(&sk).unwrap();
    assert!(doc.is_valid());
    assert!(doc.verify(verify_key));

    doc.set_property("mood", json!("rainy"));
    assert!(!doc.is_valid());
    assert!(!doc.verify(verify_key));
    assert_eq!(doc.property("mood"), Some(&json!("rainy")));

    doc.sign(&sk).unwrap();
    assert!(doc.verify(verify_key));
    assert_eq!(doc.property("mood"), Some(&json!("rainy")));
}

#[test]
fn document_wrong_key_leaves_properties() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");
    let (_, stranger_meta, _) = new_user(&registries, "hulk");

    let mut doc = Document::new("visa", id);
    doc.set_name(Some("Moky"));
    doc.sign(&sk).unwrap();
    let wire = over_the_wire(&doc.to_value());

    let mut received = registries.parse_document(&wire).unwrap();
    assert!(received.verify(meta.public_key().as_verify_key().unwrap()));
    let before = received.properties().clone();
    assert_eq!(received.name(), Some("Moky"));
    assert!(!received.verify(stranger_meta.public_key().as_verify_key().unwrap()));
    assert!(!received.is_valid());
    assert_eq!(received.properties(), &before);
}

#[test]
fn tampered_document_data_rejected() {
    let registries = Registries::with_defaults();
    let (sk, meta, id) = new_user(&registries, "moky");
    let mut doc = Document::new("visa", id);
    doc.set_name(Some("Moky"));
    doc.sign(&sk).unwrap();

    let mut wire = doc.to_map();
    let data = wire["data"].as_str().unwrap().replace("Moky", "Hulk");
    wire.insert("data".into(), json!(data));

    let mut received = registries.parse_document(&Value::Object(wire)).unwrap();
    assert!(!received.verify(meta.public_key().as_verify_key().unwrap()));
    // The forged text never becomes visible.
    assert_eq!(received.name(), None);
    assert!(received.properties().is_empty());
}

#[test]
fn group_bulletin() {
    let registries = Registries::with_defaults();
    let (sk, _, founder) = new_user(&registries, "moky");
    let group_meta = registries.generate_meta("MKM", &sk, Some("chatroom")).unwrap();
    let group = group_meta.generate_id(ENTITY_GROUP, None).unwrap();
    assert!(group.is_group());

    let mut bulletin = Bulletin::new(group.clone());
    bulletin.set_name(Some("Moky's room"));
    bulletin.set_founder(Some(&founder));
    bulletin.set_assistants(&[Id::anyone().clone()]);
    bulletin.sign(&sk).unwrap();

    // No "type" on the wire: the group ID implies a bulletin.
    let mut wire = bulletin.to_map();
    wire.remove("type");
    let doc = registries.parse_document(&Value::Object(wire)).unwrap();
    let mut received = Bulletin::try_from(doc).unwrap();
    assert!(received.verify(group_meta.public_key().as_verify_key().unwrap()));
    assert_eq!(received.founder(&registries), Some(founder));
    assert_eq!(received.assistants(&registries), vec![Id::anyone().clone()]);
}

// ---------------------------------------------------------------------------
// 4. Keys
// ---------------------------------------------------------------------------

#[test]
fn private_key_persistence() {
    let registries = Registries::with_defaults();
    let (sk, meta, _) = new_user(&registries, "moky");

    let stored = over_the_wire(&Value::Object(sk.to_map()));
    let restored = registries.parse_private_key(&stored).unwrap();
    assert!(match_key_pair(restored.as_ref(), meta.public_key().as_ref()));
    assert!(meta.match_public_key(restored.public_key().as_ref()));
}

#[test]
fn encrypted_avatar_file() {
    let registries = Registries::with_defaults();
    let password = registries.generate_symmetric_key("AES").unwrap();
    let pnf = PortableNetworkFile::encrypted(b"jpeg bytes", Arc::clone(&password), Some("a.jpg".into()))
        .unwrap();

    let received = registries
        .parse_portable_network_file(&over_the_wire(&pnf.to_value()))
        .unwrap();
    assert_eq!(received.filename(), Some("a.jpg"));
    assert_eq!(received.plaintext().unwrap(), b"jpeg bytes");
    assert_eq!(received.password().unwrap().data(), password.data());
}

// ---------------------------------------------------------------------------
// 5. Registries
// ---------------------------------------------------------------------------

/// A meta factory that refuses everything.
struct Refusing;

impl MetaFactory for Refusing {
    fn generate_meta(&self, _: &dyn PrivateKey, _: Option<&str>) -> Option<Meta> {
        None
    }

    fn create_meta(
        &self,
        _: Arc<dyn PublicKey>,
        _: Option<String>,
        _: Option<TransportableData>,
    ) -> Option<Meta> {
        None
    }

    fn parse_meta(
        &self,
        _: &serde_json::Map<String, Value>,
        _: &Registries,
    ) -> Option<Meta> {
        None
    }
}

#[test]
fn registry_override_takes_effect() {
    let registries = Registries::with_defaults();
    let (_, meta, _) = new_user(&registries, "moky");
    let wire = meta.to_value();

    registries.metas.register("1", Arc::new(Refusing));
    assert!(registries.parse_meta(&wire).is_none());

    registries.install_defaults();
    assert!(registries.parse_meta(&wire).is_some());
}

#[test]
fn broadcast_ids_from_shared_registries() {
    let anyone = Id::parse("anyone@anywhere").unwrap();
    let everyone: Id = "everyone@everywhere".parse().unwrap();

    assert_eq!(&anyone, Id::anyone());
    assert_eq!(&everyone, Id::everyone());
    assert!(anyone.is_broadcast() && anyone.is_user());
    assert!(everyone.is_broadcast() && everyone.is_group());
    assert_eq!(Id::founder().address(), Address::anywhere());
    assert!("nobody@nowhere".parse::<Id>().is_err());
}

#[test]
fn custom_address_encoding_round_trips() {
    let registries = Registries::with_defaults();
    registries.addresses.register(
        ADDRESS_BTC,
        Arc::new(BtcAddressFactory::new(
            Arc::new(Keccak256Digester),
            Arc::new(Ripemd160Digester),
        )),
    );

    let sk = Ed25519PrivateKey::generate();
    let meta = registries.generate_meta("MKM", &sk, Some("moky")).unwrap();
    let id = registries.generate_id(&meta, ENTITY_USER, None).unwrap();
    assert!(registries.match_id(&meta, &id));
    // The stock encoding cannot read it.
    assert!(Registries::with_defaults().parse_id(&id.to_string()).is_none());

    let mut visa = Visa::new(id.clone());
    visa.set_name(Some("Moky"));
    visa.sign(&sk).unwrap();
    let mut doc = registries
        .parse_document(&over_the_wire(&visa.to_value()))
        .unwrap();
    assert_eq!(doc.id(), &id);
    assert!(doc.verify(meta.public_key().as_verify_key().unwrap()));
}
