//! Falcon attestation vectors
//!
//! Signs messages with Falcon and turns each signature into a test vector
//! for an external verifier (circuit, conformance harness):
//! - attestation: slice signature, decompress `s1` into `[0, Q)`,
//!   recompute `HashToPoint(message, salt)`, attach public key `h`
//! - serialize: length-prefixed `0x` hex array, JSON encoded, and its parser
//!
//! Modules:
//! - scheme: collaborator traits (`SigningCapability`, `Decompressor`, `PointHasher`) and constants
//! - falcon: pqcrypto-falcon signer, compressed-coefficient codec, SHAKE256 hash-to-point
//! - attestation: `AttestationRecord`, `AttestationBuilder`
//! - serialize: `serialize`, `serialize_checked`, `parse`
//! - config / generator: the run the `falcon_attest` binary performs

pub mod attestation;
pub mod config;
pub mod falcon;
pub mod generator;
pub mod scheme;
pub mod serialize;

// Re-export main types for convenience
pub use attestation::{canonical, AttestError, AttestationBuilder, AttestationRecord};
pub use config::GeneratorConfig;
pub use falcon::{DecodeError, FalconDecompressor, FalconSigner, HashError, ShakePointHasher};
pub use generator::{generate_args, generate_attestations};
pub use scheme::{
    Decompressor, PointHasher, SigningCapability, SigningError, HEAD_LEN, Q, SALT_LEN,
};
pub use serialize::{flatten, parse, serialize, serialize_checked, EncodingError};
