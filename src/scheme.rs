//! Collaborator seams for the signature scheme
//!
//! The attestation pipeline never signs, decompresses or hashes on its own.
//! It consumes three capabilities:
//! - [`SigningCapability`]: owns the key pair, produces signatures, exposes `h`
//! - [`Decompressor`]: turns the compressed `s1` payload into integers
//! - [`PointHasher`]: embeds `(message, salt)` into the coefficient ring
//!
//! `crate::falcon` provides the real implementations; tests plug in doubles.

#![forbid(unsafe_code)]

use crate::falcon::{DecodeError, HashError};

/* ===== SCHEME CONSTANTS ===== */

/// Falcon prime modulus
pub const Q: u32 = 12289;

/// Signature header length in bytes (`0x30 + logn`)
pub const HEAD_LEN: usize = 1;

/// Signature salt (nonce) length in bytes
pub const SALT_LEN: usize = 40;

/* ===== SIGNING ===== */

/// Failure reported by the signing collaborator
#[derive(Debug, thiserror::Error)]
#[error("signing failed: {0}")]
pub struct SigningError(pub String);

/// A key pair bound to one scheme dimension.
///
/// `sign` takes `&mut self`: an instance is owned by exactly one caller at a
/// time and is not shared across threads.
pub trait SigningCapability {
    /// Scheme dimension `n` this capability was initialized for
    fn dimension(&self) -> usize;

    /// Public key vector `h` (length `n`, values in `[0, Q)`)
    fn public_key(&self) -> &[u32];

    /// Produce `header || salt || compressed s1` for `message`
    fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>, SigningError>;

    /// Largest signature the scheme emits (header and salt included)
    fn signature_len(&self) -> usize;

    fn header_len(&self) -> usize {
        HEAD_LEN
    }

    fn salt_len(&self) -> usize {
        SALT_LEN
    }
}

/* ===== DECODING / HASHING ===== */

/// Decoder for the compressed coefficient payload.
pub trait Decompressor {
    /// Decode exactly `n` signed coefficients from `payload`.
    ///
    /// `expected_byte_length` is the payload size the signer committed to;
    /// a longer payload is a decoding error.
    fn decompress(
        &self,
        payload: &[u8],
        expected_byte_length: usize,
        n: usize,
    ) -> Result<Vec<i32>, DecodeError>;
}

/// Deterministic `(message, salt) -> Z_q^n` embedding.
pub trait PointHasher {
    fn hash_to_point(&self, message: &[u8], salt: &[u8], n: usize)
        -> Result<Vec<u32>, HashError>;
}
