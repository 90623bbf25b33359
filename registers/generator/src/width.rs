// Licensed under the Apache-2.0 license

//! Register width calculation from a bit-field table.

use crate::types::BitFieldRow;
use thiserror::Error;

/// Size in bytes of one register word.
pub const WORD_BYTES: u64 = 4;

const WORD_BITS: u64 = 32;

/// Why a field table could not produce a width.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum WidthError {
    #[error("no bit indices found in any Bit(s) cell")]
    NoBitIndices,
    #[error("bit index {0} is out of range")]
    BitIndexOutOfRange(String),
}

/// Returns every unsigned integer token in `s`, in order.
///
/// Bit ranges show up as `7:4`, `[7..4]`, `31-16`, `3`, `Bit 5` and worse,
/// so this deliberately does not try to parse a `hi:lo` structure.
fn numeric_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
}

/// Computes the byte width of a register from its bit-field table.
///
/// The width is the highest bit index found, plus one, rounded up to whole
/// 32-bit words and expressed in bytes: `ceil((max + 1) / 32) * 4`.
///
/// Returns `Ok(None)` for an empty table; the caller decides the fallback
/// (a single word). A non-empty table with no bit index anywhere is an error
/// rather than a zero width.
///
/// # Examples
/// ```
/// use mmio_registers_generator::types::BitFieldRow;
/// use mmio_registers_generator::width::register_width;
/// let fields = [BitFieldRow::new("EN", "0"), BitFieldRow::new("HI", "63:32")];
/// assert_eq!(register_width(&fields), Ok(Some(8)));
/// ```
pub fn register_width(fields: &[BitFieldRow]) -> Result<Option<u64>, WidthError> {
    if fields.is_empty() {
        return Ok(None);
    }
    let mut max_bit: Option<u64> = None;
    for field in fields {
        for token in numeric_tokens(&field.bit_range) {
            let bit: u64 = token
                .parse()
                .map_err(|_| WidthError::BitIndexOutOfRange(token.to_string()))?;
            max_bit = Some(max_bit.map_or(bit, |m| m.max(bit)));
        }
    }
    let max_bit = max_bit.ok_or(WidthError::NoBitIndices)?;
    let bits = max_bit
        .checked_add(1)
        .ok_or_else(|| WidthError::BitIndexOutOfRange(max_bit.to_string()))?;
    Ok(Some(bits.div_ceil(WORD_BITS) * WORD_BYTES))
}
