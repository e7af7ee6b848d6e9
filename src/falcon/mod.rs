//! Falcon-512 / Falcon-1024 collaborators
//!
//! Signing goes through `pqcrypto-falcon` (PQClean, OS RNG). A detached
//! signature is laid out as:
//! - header byte `0x30 + logn`
//! - 40-byte salt (nonce)
//! - compressed `s1`, variable length
//!
//! The public key vector `h` is unpacked from the pqcrypto public key bytes
//! (`0x00 + logn` header, then `n` 14-bit values).

#![forbid(unsafe_code)]

pub mod codec;
pub mod hash;

pub use codec::{
    compress, decompress, modq_decode, modq_encode, DecodeError, FalconDecompressor,
};
pub use hash::{hash_to_point, HashError, ShakePointHasher};

use pqcrypto_falcon::{falcon1024, falcon512};
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _};

use crate::attestation::AttestError;
use crate::scheme::{SigningCapability, SigningError};

/// Dimensions the Falcon signer supports
pub const SUPPORTED_DIMENSIONS: [usize; 2] = [512, 1024];

/* ===== KEY MATERIAL ===== */

enum KeyPair {
    Falcon512 {
        pk: falcon512::PublicKey,
        sk: falcon512::SecretKey,
    },
    Falcon1024 {
        pk: falcon1024::PublicKey,
        sk: falcon1024::SecretKey,
    },
}

impl KeyPair {
    fn public_bytes(&self) -> &[u8] {
        match self {
            KeyPair::Falcon512 { pk, .. } => pk.as_bytes(),
            KeyPair::Falcon1024 { pk, .. } => pk.as_bytes(),
        }
    }

    fn signature_len(&self) -> usize {
        match self {
            KeyPair::Falcon512 { .. } => falcon512::signature_bytes(),
            KeyPair::Falcon1024 { .. } => falcon1024::signature_bytes(),
        }
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            KeyPair::Falcon512 { sk, .. } => {
                falcon512::detached_sign(message, sk).as_bytes().to_vec()
            }
            KeyPair::Falcon1024 { sk, .. } => {
                falcon1024::detached_sign(message, sk).as_bytes().to_vec()
            }
        }
    }
}

/* ===== SIGNER ===== */

/// Freshly generated Falcon key pair usable as a [`SigningCapability`]
pub struct FalconSigner {
    n: usize,
    keys: KeyPair,
    h: Vec<u32>,
}

impl FalconSigner {
    /// Generate a key pair for dimension `n` (512 or 1024).
    pub fn new(n: usize) -> Result<Self, AttestError> {
        let keys = match n {
            512 => {
                let (pk, sk) = falcon512::keypair();
                KeyPair::Falcon512 { pk, sk }
            }
            1024 => {
                let (pk, sk) = falcon1024::keypair();
                KeyPair::Falcon1024 { pk, sk }
            }
            other => return Err(AttestError::UnsupportedDimension(other)),
        };

        let h = decode_public_key(keys.public_bytes(), n)?;
        log::debug!("generated Falcon-{n} key pair");
        Ok(Self { n, keys, h })
    }

    /// Raw pqcrypto public key bytes (header + packed `h`)
    pub fn public_key_bytes(&self) -> &[u8] {
        self.keys.public_bytes()
    }
}

impl SigningCapability for FalconSigner {
    fn dimension(&self) -> usize {
        self.n
    }

    fn public_key(&self) -> &[u32] {
        &self.h
    }

    fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let signature = self.keys.sign(message);
        if signature.is_empty() {
            return Err(SigningError(format!(
                "Falcon-{} returned an empty signature",
                self.n
            )));
        }
        Ok(signature)
    }

    fn signature_len(&self) -> usize {
        self.keys.signature_len()
    }
}

/// `log2(n)` for a power-of-two dimension
fn logn(n: usize) -> u8 {
    n.trailing_zeros() as u8
}

/// Decode `h` from `0x00 + logn || modq(h)`.
pub fn decode_public_key(bytes: &[u8], n: usize) -> Result<Vec<u32>, DecodeError> {
    let expected = logn(n);
    let (&header, body) = bytes.split_first().ok_or(DecodeError::PublicKeyLength {
        len: 0,
        expected: codec::modq_encoded_len(n),
    })?;
    if header != expected {
        return Err(DecodeError::PublicKeyHeader {
            found: header,
            expected,
        });
    }
    modq_decode(body, n)
}
