// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MKM Tool
//!
//! Entry point for the `mkm` binary. Parses CLI arguments, initializes
//! logging, runs one command against the shared registries and prints its
//! JSON result on stdout.
//!
//! - `keygen`     — generate a private key
//! - `meta`       — generate a meta from a private key
//! - `id`         — derive an ID from a meta
//! - `parse-id`   — parse and classify an ID
//! - `doc-sign`   — build and sign a document
//! - `doc-verify` — verify a document against a meta

mod cli;
mod logging;

use anyhow::{anyhow, bail, ensure, Context, Result};
use clap::Parser;
use serde_json::{json, Map, Value};
use std::path::Path;

use mkm_protocol::crypto::CryptographyKey;
use mkm_protocol::identity::{format_search_number, EntityType};
use mkm_protocol::Registries;

use cli::{Commands, MkmCli};

fn main() -> Result<()> {
    let cli = MkmCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let registries = Registries::shared();
    let output = match cli.command {
        Commands::Keygen(args) => keygen(args, registries),
        Commands::Meta(args) => meta(args, registries),
        Commands::Id(args) => id(args, registries),
        Commands::ParseId(args) => parse_id(args, registries),
        Commands::DocSign(args) => doc_sign(args, registries),
        Commands::DocVerify(args) => doc_verify(args, registries),
    }?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn keygen(args: cli::KeygenArgs, registries: &Registries) -> Result<Value> {
    let key = registries
        .generate_private_key(&args.algorithm)
        .with_context(|| format!("unsupported key algorithm: {}", args.algorithm))?;
    tracing::info!(algorithm = key.algorithm(), "private key generated");
    Ok(Value::Object(key.to_map()))
}

fn meta(args: cli::MetaArgs, registries: &Registries) -> Result<Value> {
    let key = registries
        .parse_private_key(&read_json(&args.key)?)
        .with_context(|| format!("not a private key: {}", args.key.display()))?;
    let meta = registries
        .generate_meta(&args.meta_type, key.as_ref(), args.seed.as_deref())
        .with_context(|| {
            format!(
                "cannot generate a type {} meta with this key and seed",
                args.meta_type
            )
        })?;
    tracing::info!(meta_type = meta.meta_type(), seeded = meta.is_seeded(), "meta generated");
    Ok(meta.to_value())
}

fn id(args: cli::IdArgs, registries: &Registries) -> Result<Value> {
    let meta = registries
        .parse_meta(&read_json(&args.meta)?)
        .with_context(|| format!("not a meta: {}", args.meta.display()))?;
    let network: EntityType = args.network.parse().map_err(|e: String| anyhow!(e))?;
    let id = registries
        .generate_id(&meta, network.as_byte(), args.terminal)
        .context("meta is not valid: fingerprint does not match its key and seed")?;
    Ok(describe_id(&id))
}

fn parse_id(args: cli::ParseIdArgs, registries: &Registries) -> Result<Value> {
    let id = registries
        .parse_id(&args.id)
        .with_context(|| format!("not an ID: {}", args.id))?;
    Ok(describe_id(&id))
}

fn doc_sign(args: cli::DocSignArgs, registries: &Registries) -> Result<Value> {
    let key = registries
        .parse_private_key(&read_json(&args.key)?)
        .with_context(|| format!("not a private key: {}", args.key.display()))?;
    let sign_key = key
        .as_sign_key()
        .with_context(|| format!("{} keys cannot sign", key.algorithm()))?;
    let owner = registries
        .parse_id(&args.id)
        .with_context(|| format!("not an ID: {}", args.id))?;
    let doc_type = args
        .doc_type
        .unwrap_or_else(|| Registries::document_type(&Map::new(), &owner));

    let mut doc = registries
        .create_document(&doc_type, owner, None, None)
        .with_context(|| format!("no document factory for type {doc_type}"))?;
    for property in &args.properties {
        let (name, value) = parse_property(property)?;
        doc.set_property(name, value);
    }
    doc.sign(sign_key).context("signing failed")?;

    tracing::info!(id = %doc.id(), doc_type = doc.doc_type(), "document signed");
    Ok(doc.to_value())
}

fn doc_verify(args: cli::DocVerifyArgs, registries: &Registries) -> Result<Value> {
    let meta = registries
        .parse_meta(&read_json(&args.meta)?)
        .with_context(|| format!("not a meta: {}", args.meta.display()))?;
    let mut doc = registries
        .parse_document(&read_json(&args.doc)?)
        .with_context(|| format!("not a document: {}", args.doc.display()))?;

    ensure!(
        registries.match_id(&meta, doc.id()),
        "meta does not match document owner {}",
        doc.id()
    );
    let Some(verify_key) = meta.public_key().as_verify_key() else {
        bail!("{} keys cannot verify", meta.public_key().algorithm());
    };
    ensure!(doc.verify(verify_key), "signature does not verify");

    tracing::info!(id = %doc.id(), doc_type = doc.doc_type(), "document verified");
    Ok(json!({
        "did": doc.id().to_string(),
        "type": doc.doc_type(),
        "valid": doc.is_valid(),
        "properties": doc.properties(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// `key=value`, with the value taken as JSON when it parses as JSON.
fn parse_property(property: &str) -> Result<(&str, Value)> {
    let (name, raw) = property
        .split_once('=')
        .with_context(|| format!("property must be key=value: {property}"))?;
    ensure!(!name.is_empty(), "empty property name: {property}");
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name, value))
}

fn describe_id(id: &mkm_protocol::Id) -> Value {
    let network = EntityType::from_byte(id.network())
        .map_or_else(|| id.network().to_string(), |t| t.name().to_string());
    json!({
        "id": id.to_string(),
        "name": id.name(),
        "address": id.address().to_string(),
        "terminal": id.terminal(),
        "network": network,
        "user": id.is_user(),
        "group": id.is_group(),
        "broadcast": id.is_broadcast(),
        "search_number": id.address().search_number().map(format_search_number),
    })
}
