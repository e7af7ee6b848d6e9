//! Falcon bit-level encodings
//!
//! - compressed `s1` payload: per coefficient a sign bit, the 7 low bits of
//!   `|c|`, then `|c| >> 7` in unary (zeros closed by a one)
//! - public key `h`: `n` values of 14 bits each, packed MSB first

#![forbid(unsafe_code)]

use crate::scheme::{Decompressor, Q};

/// Largest magnitude the compressed encoding admits
pub const MAX_MAGNITUDE: u32 = 2047;

/// Bits per packed public key coefficient
const MODQ_BITS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("compressed payload too long: {len} bytes, at most {max} expected")]
    TooLong { len: usize, max: usize },

    #[error("payload exhausted after {decoded} of {expected} coefficients")]
    Truncated { decoded: usize, expected: usize },

    #[error("coefficient {index} exceeds magnitude 2047")]
    MagnitudeOverflow { index: usize },

    #[error("coefficient {index} encodes negative zero")]
    NegativeZero { index: usize },

    #[error("non-zero bits after the last coefficient")]
    NonZeroPadding,

    #[error("coefficient {index} out of range: {value}")]
    CoefficientOutOfRange { index: usize, value: i64 },

    #[error("public key body is {len} bytes, expected {expected}")]
    PublicKeyLength { len: usize, expected: usize },

    #[error("public key header {found:#04x}, expected {expected:#04x}")]
    PublicKeyHeader { found: u8, expected: u8 },
}

/* ===== BIT I/O ===== */

struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn bit(&mut self) -> Option<u32> {
        let byte = *self.bytes.get(self.pos / 8)?;
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Some(u32::from(bit))
    }

    fn bits(&mut self, count: u32) -> Option<u32> {
        (0..count).try_fold(0u32, |acc, _| Some((acc << 1) | self.bit()?))
    }

    /// True when every unread bit is zero
    fn rest_is_zero(&self) -> bool {
        let (idx, off) = (self.pos / 8, self.pos % 8);
        let mut tail = self.bytes.get(idx..).unwrap_or(&[]).iter();
        if off != 0 {
            if let Some(byte) = tail.next() {
                if byte & (0xFF >> off) != 0 {
                    return false;
                }
            }
        }
        tail.all(|&b| b == 0)
    }
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> (self.len % 8);
            }
        }
        self.len += 1;
    }

    fn push_bits(&mut self, value: u32, count: u32) {
        for shift in (0..count).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }
}

/* ===== COMPRESSED COEFFICIENTS ===== */

/// Decode `n` signed coefficients from a compressed `s1` payload.
///
/// Trailing zero bits (and zero padding bytes) are accepted; anything else
/// after the `n`-th coefficient is rejected so every vector has one encoding.
pub fn decompress(
    payload: &[u8],
    expected_byte_length: usize,
    n: usize,
) -> Result<Vec<i32>, DecodeError> {
    if payload.len() > expected_byte_length {
        return Err(DecodeError::TooLong {
            len: payload.len(),
            max: expected_byte_length,
        });
    }

    let mut reader = BitReader::new(payload);
    let mut out = Vec::with_capacity(n);

    for index in 0..n {
        let truncated = || DecodeError::Truncated {
            decoded: index,
            expected: n,
        };

        let negative = reader.bit().ok_or_else(truncated)? == 1;
        let mut magnitude = reader.bits(7).ok_or_else(truncated)?;
        loop {
            match reader.bit().ok_or_else(truncated)? {
                1 => break,
                _ => {
                    magnitude += 128;
                    if magnitude > MAX_MAGNITUDE {
                        return Err(DecodeError::MagnitudeOverflow { index });
                    }
                }
            }
        }

        if negative && magnitude == 0 {
            return Err(DecodeError::NegativeZero { index });
        }
        // magnitude <= 2047
        let value = magnitude as i32;
        out.push(if negative { -value } else { value });
    }

    if !reader.rest_is_zero() {
        return Err(DecodeError::NonZeroPadding);
    }
    Ok(out)
}

/// Inverse of [`decompress`]; output is byte aligned with zero fill.
pub fn compress(coeffs: &[i32]) -> Result<Vec<u8>, DecodeError> {
    let mut writer = BitWriter::default();
    for (index, &c) in coeffs.iter().enumerate() {
        let magnitude = c.unsigned_abs();
        if magnitude > MAX_MAGNITUDE {
            return Err(DecodeError::CoefficientOutOfRange {
                index,
                value: i64::from(c),
            });
        }
        writer.push_bit(c < 0);
        writer.push_bits(magnitude & 0x7F, 7);
        for _ in 0..(magnitude >> 7) {
            writer.push_bit(false);
        }
        writer.push_bit(true);
    }
    Ok(writer.bytes)
}

/// Stateless [`Decompressor`] backed by [`decompress`]
#[derive(Clone, Copy, Debug, Default)]
pub struct FalconDecompressor;

impl Decompressor for FalconDecompressor {
    fn decompress(
        &self,
        payload: &[u8],
        expected_byte_length: usize,
        n: usize,
    ) -> Result<Vec<i32>, DecodeError> {
        decompress(payload, expected_byte_length, n)
    }
}

/* ===== PUBLIC KEY PACKING ===== */

/// Byte length of `n` packed 14-bit values
pub const fn modq_encoded_len(n: usize) -> usize {
    (n * MODQ_BITS as usize + 7) / 8
}

/// Unpack `n` 14-bit values, each required to be below `Q`.
pub fn modq_decode(body: &[u8], n: usize) -> Result<Vec<u32>, DecodeError> {
    let expected = modq_encoded_len(n);
    if body.len() != expected {
        return Err(DecodeError::PublicKeyLength {
            len: body.len(),
            expected,
        });
    }

    let mut reader = BitReader::new(body);
    let mut out = Vec::with_capacity(n);
    for index in 0..n {
        let value = reader.bits(MODQ_BITS).ok_or(DecodeError::Truncated {
            decoded: index,
            expected: n,
        })?;
        if value >= Q {
            return Err(DecodeError::CoefficientOutOfRange {
                index,
                value: i64::from(value),
            });
        }
        out.push(value);
    }

    if !reader.rest_is_zero() {
        return Err(DecodeError::NonZeroPadding);
    }
    Ok(out)
}

/// Pack values below `Q` into 14-bit fields (inverse of [`modq_decode`]).
pub fn modq_encode(values: &[u32]) -> Result<Vec<u8>, DecodeError> {
    let mut writer = BitWriter::default();
    for (index, &v) in values.iter().enumerate() {
        if v >= Q {
            return Err(DecodeError::CoefficientOutOfRange {
                index,
                value: i64::from(v),
            });
        }
        writer.push_bits(v, MODQ_BITS);
    }
    Ok(writer.bytes)
}
