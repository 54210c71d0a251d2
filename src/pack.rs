//! Struct-style fixed-width integer packing.
//!
//! A format string is an optional byte-order mark followed by one code per
//! field:
//!
//! | code | width |
//! |------|-------|
//! | `B`  | 1     |
//! | `H`  | 2     |
//! | `I`, `L` | 4 |
//!
//! `>` selects big-endian (the default), `<` little-endian. Values wider than
//! their field are masked, never rejected; a value list whose length differs
//! from the field count is an error.
//!
//! ```rust
//! use comment_roundtrip::pack::pack_format;
//!
//! let bytes = pack_format(">IB", &[0x0102_0304, 0x1FF]).unwrap();
//! assert_eq!(bytes, [1, 2, 3, 4, 0xFF]);
//! ```

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSpec {
    endian: Endian,
    widths: Vec<usize>,
}

impl PackSpec {
    pub fn parse(format: &str) -> Result<Self> {
        let mut chars = format.chars().peekable();
        let endian = match chars.peek() {
            Some('>') => {
                chars.next();
                Endian::Big
            }
            Some('<') => {
                chars.next();
                Endian::Little
            }
            _ => Endian::Big,
        };

        let widths = chars
            .map(|c| match c {
                'B' => Ok(1),
                'H' => Ok(2),
                'I' | 'L' => Ok(4),
                other => Err(Error::InvalidSpecification(format!(
                    "unknown field code {other:?} in {format:?}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { endian, widths })
    }

    pub fn field_count(&self) -> usize {
        self.widths.len()
    }

    /// Total number of bytes one packed record occupies.
    pub fn byte_len(&self) -> usize {
        self.widths.iter().sum()
    }
}

/// Pack `values` according to `spec`.
pub fn pack(spec: &PackSpec, values: &[u32]) -> Result<Vec<u8>> {
    if values.len() != spec.field_count() {
        return Err(Error::InvalidSpecification(format!(
            "{} field(s) but {} value(s)",
            spec.field_count(),
            values.len()
        )));
    }

    let mut out = Vec::with_capacity(spec.byte_len());
    for (&width, &value) in spec.widths.iter().zip(values) {
        let be = value.to_be_bytes();
        let field = &be[4 - width..];
        match spec.endian {
            Endian::Big => out.extend_from_slice(field),
            Endian::Little => out.extend(field.iter().rev()),
        }
    }
    Ok(out)
}

/// Parse `format` and pack `values` in one call.
pub fn pack_format(format: &str, values: &[u32]) -> Result<Vec<u8>> {
    pack(&PackSpec::parse(format)?, values)
}

/// Inverse of [`pack`]: read one record from the front of `bytes`.
pub fn unpack(spec: &PackSpec, bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() < spec.byte_len() {
        return Err(Error::InvalidSpecification(format!(
            "need {} byte(s), have {}",
            spec.byte_len(),
            bytes.len()
        )));
    }

    let mut values = Vec::with_capacity(spec.field_count());
    let mut pos = 0;
    for &width in &spec.widths {
        let field = &bytes[pos..pos + width];
        let value = match spec.endian {
            Endian::Big => field.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
            Endian::Little => field.iter().rev().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
        };
        values.push(value);
        pos += width;
    }
    Ok(values)
}
