//! Falcon attestation generator CLI
//!
//! Prints one line to stdout: the JSON hex array (or the raw records).
//! Logs go to stderr.
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use falcon_attest::config::{DEFAULT_DIMENSION, DEFAULT_SIGNATURES};
use falcon_attest::{generate_attestations, serialize_checked, GeneratorConfig};
use log::LevelFilter;

/* ===== CLI STRUCTURE ===== */

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Length-prefixed hex integer array
    Args,
    /// JSON array of {s1, pk, msg_point} objects
    Records,
}

#[derive(Parser, Debug)]
#[command(name = "falcon_attest", version)]
#[command(about = "Generate Falcon signature attestations as a length-prefixed hex array")]
struct Cli {
    /// Scheme dimension (512 or 1024)
    #[arg(short = 'n', long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// Number of messages to sign
    #[arg(short = 'k', long = "signatures", default_value_t = DEFAULT_SIGNATURES)]
    num_signatures: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Args)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GeneratorConfig::new(cli.dimension, cli.num_signatures);
    let records = generate_attestations(&config)?;

    let line = match cli.format {
        OutputFormat::Args => serialize_checked(&records, config.dimension)?,
        OutputFormat::Records => {
            serde_json::to_string(&records).context("encoding attestation records")?
        }
    };
    println!("{line}");
    Ok(())
}
