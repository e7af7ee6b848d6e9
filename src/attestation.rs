//! Attestation extraction
//!
//! Signs a message, slices the signature into header / salt / compressed
//! payload, decompresses `s1` into `[0, Q)`, re-derives the hashed message
//! point from the same salt and bundles it with the public key `h`.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::falcon::{DecodeError, FalconDecompressor, HashError, ShakePointHasher};
use crate::scheme::{Decompressor, PointHasher, SigningCapability, SigningError, Q};

/* ===== TYPES ===== */

/// One signed message, ready for serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Decompressed signature vector, reduced into `[0, Q)`
    pub s1: Vec<u32>,
    /// Public key vector `h`
    pub pk: Vec<u32>,
    /// `HashToPoint(message, salt)`
    pub msg_point: Vec<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    #[error("capability is bound to dimension {actual}, builder expects {expected}")]
    InvalidCapability { expected: usize, actual: usize },

    #[error("no Falcon parameter set for dimension {0}")]
    UnsupportedDimension(usize),

    #[error("signature is {len} bytes, header and salt need {required}")]
    MalformedSignature { len: usize, required: usize },

    #[error("decompression failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("hash-to-point failed: {0}")]
    Hash(#[from] HashError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Reduce a signed coefficient into `[0, Q)`.
#[inline]
pub fn canonical(c: i32) -> u32 {
    // rem_euclid with a positive modulus is never negative
    c.rem_euclid(Q as i32) as u32
}

/* ===== BUILDER ===== */

/// Builds [`AttestationRecord`]s for a fixed scheme dimension.
pub struct AttestationBuilder<D = FalconDecompressor, H = ShakePointHasher> {
    dimension: usize,
    decompressor: D,
    hasher: H,
}

impl AttestationBuilder {
    /// Builder wired to the Falcon decompressor and SHAKE256 point hasher
    pub fn falcon(dimension: usize) -> Self {
        Self::new(dimension, FalconDecompressor, ShakePointHasher)
    }
}

impl<D: Decompressor, H: PointHasher> AttestationBuilder<D, H> {
    pub fn new(dimension: usize, decompressor: D, hasher: H) -> Self {
        Self {
            dimension,
            decompressor,
            hasher,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Sign `message` with `capability` and extract its attestation.
    pub fn build<C: SigningCapability>(
        &self,
        capability: &mut C,
        message: &[u8],
    ) -> Result<AttestationRecord, AttestError> {
        self.check_capability(capability)?;

        let signature = capability.sign(message)?;
        let (head_len, salt_len) = (capability.header_len(), capability.salt_len());
        let required = head_len + salt_len;
        if signature.len() < required {
            return Err(AttestError::MalformedSignature {
                len: signature.len(),
                required,
            });
        }

        let salt = &signature[head_len..required];
        let encoded = &signature[required..];
        log::debug!(
            "signature {} bytes, compressed s1 {} bytes",
            signature.len(),
            encoded.len()
        );

        // payload budget of the scheme, not of this particular signature
        let expected_byte_length = capability.signature_len().saturating_sub(required);
        let raw = self
            .decompressor
            .decompress(encoded, expected_byte_length, self.dimension)?;
        let s1 = raw.into_iter().map(canonical).collect();

        let msg_point = self.hasher.hash_to_point(message, salt, self.dimension)?;

        Ok(AttestationRecord {
            s1,
            pk: capability.public_key().to_vec(),
            msg_point,
        })
    }

    /// [`build`](Self::build) each message in order; stops at the first error.
    pub fn build_many<C, I, M>(
        &self,
        capability: &mut C,
        messages: I,
    ) -> Result<Vec<AttestationRecord>, AttestError>
    where
        C: SigningCapability,
        I: IntoIterator<Item = M>,
        M: AsRef<[u8]>,
    {
        messages
            .into_iter()
            .map(|m| self.build(capability, m.as_ref()))
            .collect()
    }

    fn check_capability<C: SigningCapability>(&self, capability: &C) -> Result<(), AttestError> {
        let invalid = |actual| AttestError::InvalidCapability {
            expected: self.dimension,
            actual,
        };
        if capability.dimension() != self.dimension {
            return Err(invalid(capability.dimension()));
        }
        // an uninitialized capability has no public key yet
        if capability.public_key().len() != self.dimension {
            return Err(invalid(capability.public_key().len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falcon::compress;
    use crate::scheme::{HEAD_LEN, SALT_LEN};

    /// Signs by emitting a fixed header, fixed salt and a preset payload
    struct ScriptedSigner {
        n: usize,
        h: Vec<u32>,
        salt: [u8; SALT_LEN],
        payload: Vec<u8>,
    }

    impl ScriptedSigner {
        fn new(n: usize, coeffs: &[i32]) -> Self {
            Self {
                n,
                h: (0..n as u32).collect(),
                salt: [0x42; SALT_LEN],
                payload: compress(coeffs).unwrap(),
            }
        }
    }

    impl SigningCapability for ScriptedSigner {
        fn dimension(&self) -> usize {
            self.n
        }

        fn public_key(&self) -> &[u32] {
            &self.h
        }

        fn sign(&mut self, _message: &[u8]) -> Result<Vec<u8>, SigningError> {
            let mut sig = vec![0x39];
            sig.extend_from_slice(&self.salt);
            sig.extend_from_slice(&self.payload);
            Ok(sig)
        }

        fn signature_len(&self) -> usize {
            // worst case: 24 bits per coefficient
            HEAD_LEN + SALT_LEN + 3 * self.n
        }
    }

    /// Returns a preset raw vector regardless of the payload
    struct StubDecompressor(Vec<i32>);

    impl Decompressor for StubDecompressor {
        fn decompress(&self, _: &[u8], _: usize, _: usize) -> Result<Vec<i32>, DecodeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingHasher;

    impl PointHasher for FailingHasher {
        fn hash_to_point(&self, _: &[u8], _: &[u8], _: usize) -> Result<Vec<u32>, HashError> {
            Err(HashError::ZeroDimension)
        }
    }

    /// Echoes a fixed point so only `s1` depends on the decompressor
    struct ConstHasher(Vec<u32>);

    impl PointHasher for ConstHasher {
        fn hash_to_point(&self, _: &[u8], _: &[u8], _: usize) -> Result<Vec<u32>, HashError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn canonical_reduction() {
        assert_eq!(canonical(0), 0);
        assert_eq!(canonical(-1), Q - 1);
        assert_eq!(canonical(-2047), Q - 2047);
        assert_eq!(canonical(2047), 2047);
    }

    #[test]
    fn build_normalizes_s1() {
        let coeffs = [-1, 0, 5, -300, 2047, -2047, 1, 0];
        let mut signer = ScriptedSigner::new(8, &coeffs);
        let record = AttestationBuilder::falcon(8).build(&mut signer, b"m").unwrap();

        assert_eq!(record.s1, vec![Q - 1, 0, 5, Q - 300, 2047, Q - 2047, 1, 0]);
        assert_eq!(record.pk, (0..8).collect::<Vec<u32>>());
        assert_eq!(record.msg_point.len(), 8);
    }

    #[test]
    fn msg_point_uses_signature_salt() {
        let mut signer = ScriptedSigner::new(4, &[1, 2, 3, 4]);
        signer.salt = [0x07; SALT_LEN];
        let record = AttestationBuilder::falcon(4).build(&mut signer, b"salted").unwrap();
        let expected = crate::falcon::hash_to_point(b"salted", &[0x07; SALT_LEN], 4).unwrap();
        assert_eq!(record.msg_point, expected);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let mut signer = ScriptedSigner::new(4, &[1, 2, 3, 4]);
        let err = AttestationBuilder::falcon(8).build(&mut signer, b"m").unwrap_err();
        assert!(matches!(
            err,
            AttestError::InvalidCapability { expected: 8, actual: 4 }
        ));
    }

    #[test]
    fn missing_public_key_rejected() {
        let mut signer = ScriptedSigner::new(4, &[1, 2, 3, 4]);
        signer.h.clear();
        let err = AttestationBuilder::falcon(4).build(&mut signer, b"m").unwrap_err();
        assert!(matches!(
            err,
            AttestError::InvalidCapability { expected: 4, actual: 0 }
        ));
    }

    #[test]
    fn short_signature_is_malformed() {
        struct Stub;
        impl SigningCapability for Stub {
            fn dimension(&self) -> usize {
                1
            }
            fn public_key(&self) -> &[u32] {
                &[7]
            }
            fn sign(&mut self, _: &[u8]) -> Result<Vec<u8>, SigningError> {
                Ok(vec![0x39; HEAD_LEN + SALT_LEN - 1])
            }
            fn signature_len(&self) -> usize {
                HEAD_LEN + SALT_LEN + 3
            }
        }

        let err = AttestationBuilder::falcon(1).build(&mut Stub, b"m").unwrap_err();
        assert!(matches!(
            err,
            AttestError::MalformedSignature { len: 40, required: 41 }
        ));
    }

    #[test]
    fn decode_error_propagates() {
        let mut signer = ScriptedSigner::new(4, &[1, 2]);
        let err = AttestationBuilder::falcon(4).build(&mut signer, b"m").unwrap_err();
        assert!(matches!(err, AttestError::Decode(DecodeError::Truncated { .. })));
    }

    #[test]
    fn oversized_payload_rejected() {
        let mut signer = ScriptedSigner::new(512, &[1; 512]);
        signer.payload.extend(std::iter::repeat(0u8).take(5000));
        let err = AttestationBuilder::falcon(512).build(&mut signer, b"m").unwrap_err();
        assert!(matches!(
            err,
            AttestError::Decode(DecodeError::TooLong { max: 1536, .. })
        ));
    }

    #[test]
    fn hash_error_propagates() {
        let mut signer = ScriptedSigner::new(4, &[1, 2, 3, 4]);
        let builder = AttestationBuilder::new(4, StubDecompressor(vec![0; 4]), FailingHasher);
        let err = builder.build(&mut signer, b"m").unwrap_err();
        assert!(matches!(err, AttestError::Hash(HashError::ZeroDimension)));
    }

    #[test]
    fn injected_decompressor_output_is_reduced() {
        let q = Q as i32;
        let raw = vec![-1, q + 5, -3 * q, 2 * q - 1];
        let mut signer = ScriptedSigner::new(4, &[0, 0, 0, 0]);
        let builder = AttestationBuilder::new(4, StubDecompressor(raw), ConstHasher(vec![9; 4]));

        let record = builder.build(&mut signer, b"m").unwrap();
        assert_eq!(record.s1, vec![Q - 1, 5, 0, Q - 1]);
        assert_eq!(record.msg_point, vec![9; 4]);
        assert!(record.s1.iter().all(|&c| c < Q));
    }

    #[test]
    fn build_many_preserves_order() {
        let mut signer = ScriptedSigner::new(4, &[1, -1, 2, -2]);
        let builder = AttestationBuilder::falcon(4);
        let messages = ["a", "b", "c"];
        let records = builder.build_many(&mut signer, messages).unwrap();

        assert_eq!(records.len(), 3);
        for (record, msg) in records.iter().zip(messages) {
            let expected =
                crate::falcon::hash_to_point(msg.as_bytes(), &signer.salt, 4).unwrap();
            assert_eq!(record.msg_point, expected);
        }
    }

    #[test]
    fn build_many_empty() {
        let mut signer = ScriptedSigner::new(4, &[0, 0, 0, 0]);
        let records = AttestationBuilder::falcon(4)
            .build_many(&mut signer, Vec::<Vec<u8>>::new())
            .unwrap();
        assert!(records.is_empty());
    }
}
