//! Falcon HashToPoint
//!
//! SHAKE256 over `salt || message`, read as big-endian 16-bit words.
//! Words at or above `5 * Q` are rejected so the `mod Q` reduction is uniform.

#![forbid(unsafe_code)]

use tiny_keccak::{Hasher, Shake, Xof};

use crate::scheme::{PointHasher, Q, SALT_LEN};

/// Rejection bound: largest multiple of `Q` that fits in 16 bits
const ACCEPT_BOUND: u32 = (1 << 16) / Q * Q;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("cannot hash to a point of dimension 0")]
    ZeroDimension,

    #[error("salt must be {expected} bytes, got {len}")]
    SaltLength { len: usize, expected: usize },
}

/// Map `(message, salt)` to `n` coefficients in `[0, Q)`.
pub fn hash_to_point(message: &[u8], salt: &[u8], n: usize) -> Result<Vec<u32>, HashError> {
    if n == 0 {
        return Err(HashError::ZeroDimension);
    }
    if salt.len() != SALT_LEN {
        return Err(HashError::SaltLength {
            len: salt.len(),
            expected: SALT_LEN,
        });
    }

    let mut shake = Shake::v256();
    shake.update(salt);
    shake.update(message);

    let mut point = Vec::with_capacity(n);
    let mut word = [0u8; 2];
    while point.len() < n {
        shake.squeeze(&mut word);
        let value = u32::from(u16::from_be_bytes(word));
        if value < ACCEPT_BOUND {
            point.push(value % Q);
        }
    }
    Ok(point)
}

/// [`PointHasher`] backed by [`hash_to_point`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ShakePointHasher;

impl PointHasher for ShakePointHasher {
    fn hash_to_point(
        &self,
        message: &[u8],
        salt: &[u8],
        n: usize,
    ) -> Result<Vec<u32>, HashError> {
        hash_to_point(message, salt, n)
    }
}
