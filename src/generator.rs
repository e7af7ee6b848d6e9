//! End-to-end run: key generation, attestation and encoding

#![forbid(unsafe_code)]

use anyhow::{Context, Result};

use crate::attestation::{AttestationBuilder, AttestationRecord};
use crate::config::GeneratorConfig;
use crate::falcon::FalconSigner;
use crate::serialize::serialize_checked;

/// Generate a fresh Falcon key and one attestation per configured message.
pub fn generate_attestations(config: &GeneratorConfig) -> Result<Vec<AttestationRecord>> {
    config.validate()?;

    let mut signer = FalconSigner::new(config.dimension)
        .with_context(|| format!("Falcon-{} key generation", config.dimension))?;
    let builder = AttestationBuilder::falcon(config.dimension);

    log::info!(
        "signing {} message(s) with Falcon-{}",
        config.num_signatures,
        config.dimension
    );
    let records = builder
        .build_many(&mut signer, config.messages())
        .context("building attestations")?;
    log::info!("built {} attestation(s)", records.len());
    Ok(records)
}

/// Generate and encode in one go (the canonical hex array).
pub fn generate_args(config: &GeneratorConfig) -> Result<String> {
    let records = generate_attestations(config)?;
    serialize_checked(&records, config.dimension).context("encoding attestations")
}
