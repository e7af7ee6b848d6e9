//! Canonical attestation encoding
//!
//! Layout (every entry an unsigned integer):
//!
//! ```text
//! [count, (len(s1), s1.., len(pk), pk.., len(msg_point), msg_point..) * count, dimension]
//! ```
//!
//! Each integer is written as lowercase `0x` hex and the whole sequence as a
//! JSON array of strings with `", "` between elements. Every vector carries its
//! own length, so [`parse`] can rebuild the records without a schema.

#![forbid(unsafe_code)]

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::attestation::AttestationRecord;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("record {record}: {field} has {len} entries, dimension is {dimension}")]
    DimensionMismatch {
        record: usize,
        field: &'static str,
        len: usize,
        dimension: usize,
    },

    #[error("element {index} is not canonical 0x-prefixed lowercase hex: {value:?}")]
    BadHex { index: usize, value: String },

    #[error("element {index} does not fit its slot: {value:#x}")]
    OutOfRange { index: usize, value: u64 },

    #[error("array ended at element {index}, expected more")]
    Truncated { index: usize },

    #[error("{extra} element(s) after the trailing dimension")]
    TrailingElements { extra: usize },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoded output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/* ===== FLATTEN ===== */

/// Lay the records out as one flat integer sequence.
pub fn flatten(records: &[AttestationRecord], dimension: usize) -> Vec<u64> {
    let body: usize = records
        .iter()
        .map(|r| 3 + r.s1.len() + r.pk.len() + r.msg_point.len())
        .sum();
    let mut out = Vec::with_capacity(body + 2);

    out.push(records.len() as u64);
    for record in records {
        for field in [&record.s1, &record.pk, &record.msg_point] {
            out.push(field.len() as u64);
            out.extend(field.iter().map(|&c| u64::from(c)));
        }
    }
    out.push(dimension as u64);
    out
}

/* ===== JSON RENDERING ===== */

/// Compact JSON with `", "` between array elements
#[derive(Clone, Copy, Default)]
struct SpacedArrayFormatter;

impl Formatter for SpacedArrayFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

fn to_hex_json(values: &[u64]) -> Result<String, EncodingError> {
    let hex: Vec<String> = values.iter().map(|v| format!("{v:#x}")).collect();

    let mut buf = Vec::with_capacity(hex.len() * 8);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedArrayFormatter);
    hex.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Encode `records` with `dimension` as trailing metadata.
///
/// Vector lengths are not compared to `dimension`; see [`serialize_checked`].
pub fn serialize(records: &[AttestationRecord], dimension: usize) -> Result<String, EncodingError> {
    to_hex_json(&flatten(records, dimension))
}

/// Like [`serialize`], but every vector must have exactly `dimension` entries.
pub fn serialize_checked(
    records: &[AttestationRecord],
    dimension: usize,
) -> Result<String, EncodingError> {
    for (index, record) in records.iter().enumerate() {
        let fields = [
            ("s1", record.s1.len()),
            ("pk", record.pk.len()),
            ("msg_point", record.msg_point.len()),
        ];
        if let Some(&(field, len)) = fields.iter().find(|(_, len)| *len != dimension) {
            return Err(EncodingError::DimensionMismatch {
                record: index,
                field,
                len,
                dimension,
            });
        }
    }
    serialize(records, dimension)
}

/* ===== PARSE ===== */

struct Cursor {
    values: Vec<u64>,
    pos: usize,
}

impl Cursor {
    fn next(&mut self) -> Result<u64, EncodingError> {
        let value = *self
            .values
            .get(self.pos)
            .ok_or(EncodingError::Truncated { index: self.pos })?;
        self.pos += 1;
        Ok(value)
    }

    fn next_usize(&mut self) -> Result<usize, EncodingError> {
        let index = self.pos;
        let value = self.next()?;
        usize::try_from(value).map_err(|_| EncodingError::OutOfRange { index, value })
    }

    fn vector(&mut self) -> Result<Vec<u32>, EncodingError> {
        let len = self.next_usize()?;
        let remaining = self.values.len() - self.pos;
        if len > remaining {
            return Err(EncodingError::Truncated {
                index: self.values.len(),
            });
        }
        (0..len)
            .map(|_| {
                let index = self.pos;
                let value = self.next()?;
                u32::try_from(value).map_err(|_| EncodingError::OutOfRange { index, value })
            })
            .collect()
    }
}

fn parse_hex(index: usize, text: &str) -> Result<u64, EncodingError> {
    let bad = || EncodingError::BadHex {
        index,
        value: text.to_string(),
    };
    let digits = text.strip_prefix("0x").ok_or_else(bad)?;
    // exactly what `{:#x}` produces: lowercase, no leading zeros
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && (digits == "0" || !digits.starts_with('0'));
    if !canonical {
        return Err(bad());
    }
    u64::from_str_radix(digits, 16).map_err(|_| bad())
}

/// Decode an array produced by [`serialize`] back into records and dimension.
pub fn parse(encoded: &str) -> Result<(Vec<AttestationRecord>, usize), EncodingError> {
    let strings: Vec<String> = serde_json::from_str(encoded)?;
    let values = strings
        .iter()
        .enumerate()
        .map(|(index, s)| parse_hex(index, s))
        .collect::<Result<Vec<u64>, _>>()?;

    let mut cursor = Cursor { values, pos: 0 };
    let count = cursor.next_usize()?;

    let mut records = Vec::new();
    for _ in 0..count {
        records.push(AttestationRecord {
            s1: cursor.vector()?,
            pk: cursor.vector()?,
            msg_point: cursor.vector()?,
        });
    }
    let dimension = cursor.next_usize()?;

    let extra = cursor.values.len() - cursor.pos;
    if extra != 0 {
        return Err(EncodingError::TrailingElements { extra });
    }
    Ok((records, dimension))
}
