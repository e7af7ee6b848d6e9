//! Run configuration for the attestation generator

#![forbid(unsafe_code)]

use anyhow::{ensure, Result};

use crate::falcon::SUPPORTED_DIMENSIONS;

pub const DEFAULT_DIMENSION: usize = 512;
pub const DEFAULT_SIGNATURES: usize = 1;

/// Scheme dimension and how many messages to sign
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub dimension: usize,
    pub num_signatures: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            num_signatures: DEFAULT_SIGNATURES,
        }
    }
}

impl GeneratorConfig {
    pub fn new(dimension: usize, num_signatures: usize) -> Self {
        Self {
            dimension,
            num_signatures,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            SUPPORTED_DIMENSIONS.contains(&self.dimension),
            "Unsupported dimension {}: expected one of {:?}",
            self.dimension,
            SUPPORTED_DIMENSIONS
        );
        Ok(())
    }

    /// `message #0`, `message #1`, ...
    pub fn messages(&self) -> impl Iterator<Item = Vec<u8>> {
        (0..self.num_signatures).map(|i| format!("message #{i}").into_bytes())
    }
}
