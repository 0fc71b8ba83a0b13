// Identity benchmarks for the MKM protocol.
//
// Covers meta generation, address derivation for both encodings, ID and
// meta parsing, and document sign/verify over growing property sets.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use mkm_protocol::config::ENTITY_USER;
use mkm_protocol::crypto::{Ed25519PrivateKey, PrivateKey};
use mkm_protocol::{Document, Registries};

fn bench_generate_meta(c: &mut Criterion) {
    let registries = Registries::with_defaults();
    let sk = Ed25519PrivateKey::generate();

    c.bench_function("meta/generate_mkm", |b| {
        b.iter(|| registries.generate_meta("MKM", &sk, Some("moky")).unwrap());
    });
}

fn bench_generate_address(c: &mut Criterion) {
    let registries = Registries::with_defaults();
    let sk = Ed25519PrivateKey::generate();
    let mut group = c.benchmark_group("meta/generate_address");

    for meta_type in ["MKM", "ExETH"] {
        let meta = registries.generate_meta(meta_type, &sk, Some("moky")).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(meta_type), &meta, |b, meta| {
            b.iter(|| registries.generate_address(meta, ENTITY_USER).unwrap());
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let registries = Registries::with_defaults();
    let sk = Ed25519PrivateKey::generate();
    let meta = registries.generate_meta("MKM", &sk, Some("moky")).unwrap();
    let id = meta.generate_id(ENTITY_USER, Some("phone".into())).unwrap().to_string();
    let meta_value = meta.to_value();

    c.bench_function("parse/id", |b| {
        b.iter(|| registries.parse_id(&id).unwrap());
    });
    c.bench_function("parse/meta", |b| {
        b.iter(|| registries.parse_meta(&meta_value).unwrap());
    });
}

fn bench_document(c: &mut Criterion) {
    let registries = Registries::with_defaults();
    let sk = Ed25519PrivateKey::generate();
    let pk = sk.public_key();
    let id = registries
        .generate_meta("MKM", &sk, Some("moky"))
        .unwrap()
        .generate_id(ENTITY_USER, None)
        .unwrap();
    let mut group = c.benchmark_group("document/sign_verify");

    for size in [1, 10, 100] {
        let mut doc = Document::new("visa", id.clone());
        for i in 0..size {
            doc.set_property(format!("field-{i:03}"), json!(format!("value {i}")));
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| {
                let mut doc = doc.clone();
                doc.sign(&sk).unwrap();
                assert!(doc.verify(pk.as_verify_key().unwrap()));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_meta,
    bench_generate_address,
    bench_parse,
    bench_document,
);
criterion_main!(benches);
