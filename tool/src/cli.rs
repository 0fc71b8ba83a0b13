//! # CLI Interface
//!
//! Command-line argument structure for `mkm`, via `clap` derive. Every
//! command prints JSON on stdout; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// MKM identity tool.
///
/// Generates keys and metas, derives and inspects IDs, and signs or
/// verifies profile documents. Files are the JSON maps the library reads
/// and writes, so the output of one command feeds the next.
#[derive(Parser, Debug)]
#[command(name = "mkm", about = "MKM identity tool", version, propagate_version = true)]
pub struct MkmCli {
    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "MKM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Default log filter. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, env = "MKM_LOG", default_value = "mkm=info,mkm_protocol=warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a private key and print its key map.
    Keygen(KeygenArgs),
    /// Generate a meta from a private key file.
    Meta(MetaArgs),
    /// Derive an ID from a meta file.
    Id(IdArgs),
    /// Parse an ID string and show what it is.
    ParseId(ParseIdArgs),
    /// Build and sign a document from `key=value` properties.
    DocSign(DocSignArgs),
    /// Verify a signed document against its owner's meta.
    DocVerify(DocVerifyArgs),
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key algorithm, e.g. Ed25519 or X25519.
    #[arg(long, short = 'a', default_value = "Ed25519")]
    pub algorithm: String,
}

#[derive(Args, Debug)]
pub struct MetaArgs {
    /// Private key map (JSON) produced by `keygen`.
    #[arg(long, short = 'k')]
    pub key: PathBuf,

    /// Meta type, by number or name: 1/MKM, 2/BTC, 3/ExBTC, 4/ETH, 5/ExETH.
    #[arg(long = "type", short = 't', default_value = "MKM")]
    pub meta_type: String,

    /// Seed (the ID name). Required by MKM and the Ex types.
    #[arg(long, short = 's')]
    pub seed: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Meta (JSON) produced by `meta`.
    #[arg(long, short = 'm')]
    pub meta: PathBuf,

    /// Entity type: a name such as user, group, bot, or a number.
    #[arg(long, short = 'n', default_value = "user")]
    pub network: String,

    /// Terminal suffix, e.g. a device name.
    #[arg(long)]
    pub terminal: Option<String>,
}

#[derive(Args, Debug)]
pub struct ParseIdArgs {
    /// ID string: `name@address[/terminal]` or a bare address.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DocSignArgs {
    /// Private key map (JSON) of the document owner.
    #[arg(long, short = 'k')]
    pub key: PathBuf,

    /// Owner ID.
    #[arg(long)]
    pub id: String,

    /// Document type. Defaults to visa for users, bulletin for groups.
    #[arg(long = "type", short = 't')]
    pub doc_type: Option<String>,

    /// Properties as `key=value`. Values that parse as JSON are kept as
    /// JSON, anything else becomes a string.
    pub properties: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DocVerifyArgs {
    /// Owner meta (JSON).
    #[arg(long, short = 'm')]
    pub meta: PathBuf,

    /// Signed document (JSON) produced by `doc-sign`.
    #[arg(long, short = 'd')]
    pub doc: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        MkmCli::command().debug_assert();
    }

    #[test]
    fn doc_sign_collects_properties() {
        let cli = MkmCli::parse_from([
            "mkm", "doc-sign", "--key", "k.json", "--id", "moky@x", "name=Moky", "age=42",
        ]);
        match cli.command {
            Commands::DocSign(args) => {
                assert_eq!(args.properties, ["name=Moky", "age=42"]);
                assert_eq!(args.doc_type, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
