//! Two's-complement helpers and bit-field packing shared by the decoder and encoder.

use std::ops::RangeInclusive;

use bitvec::prelude::*;
use num_traits::{PrimInt, Unsigned};

use crate::error::BitsError;

/// Width of a machine word and of an address.
pub const WORD_BITS: u32 = 16;

/// Reinterpret `value` as a `width`-bit two's-complement integer.
///
/// Bits above `width` are discarded; if bit `width - 1` is set the result is
/// sign-extended, otherwise it is the plain masked value. `width` must be in `1..=32`.
pub fn truncate(value: i32, width: u32) -> i32 {
    debug_assert!((1..=32).contains(&width), "width {width} out of range");
    let shift = 32 - width;
    value.wrapping_shl(shift) >> shift
}

/// Add, then truncate to `width` bits.
pub fn add(a: i32, b: i32, width: u32) -> i32 {
    truncate(a.wrapping_add(b), width)
}

/// Least and greatest values representable by a `width`-bit two's-complement integer.
pub fn bit_range(width: u32) -> RangeInclusive<i32> {
    debug_assert!((1..=32).contains(&width), "width {width} out of range");
    let pow = 1i64 << (width - 1);
    (-pow) as i32..=(pow - 1) as i32
}

pub fn fits_signed(value: i32, width: u32) -> bool {
    bit_range(width).contains(&value)
}

/// Extract the inclusive bit range `[from, to]` of `word`, right-aligned.
pub fn fetch_bits<T: PrimInt + Unsigned>(word: T, from: u32, to: u32) -> T {
    let bits = T::zero().count_zeros();
    debug_assert!(from <= to && to < bits, "bad bit range [{from}, {to}]");
    let len = to - from + 1;
    let mask = if len >= bits {
        !T::zero()
    } else {
        (T::one() << len as usize) - T::one()
    };
    (word >> from as usize) & mask
}

pub fn test_bit<T: PrimInt + Unsigned>(word: T, index: u32) -> bool {
    fetch_bits(word, index, index) == T::one()
}

/// Build an integer from concatenated binary-digit strings, most significant first.
///
/// `from_bits(&["0001", "110"])` is `0b0001_110`. Handy for writing instruction words
/// field by field in tests.
pub fn from_bits(parts: &[&str]) -> Result<u32, BitsError> {
    let mut value = 0u32;
    let mut len = 0u32;
    for part in parts {
        for c in part.chars() {
            let bit = match c {
                '0' => 0,
                '1' => 1,
                other => return Err(BitsError::BadDigit(other)),
            };
            len += 1;
            if len > 32 {
                return Err(BitsError::TooWide(len));
            }
            value = (value << 1) | bit;
        }
    }
    Ok(value)
}

/// A named bit field occupying bits `start..=end` of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

impl Field {
    pub const fn new(name: &'static str, start: u32, end: u32) -> Self {
        Self { name, start, end }
    }

    pub const fn width(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Packs a fixed list of fields on top of a base word.
///
/// Each value is masked to its field width before being ORed in; a value that does not
/// fit loses its high bits (logged at `warn`). Callers range-check first.
#[derive(Debug, Clone, Copy)]
pub struct BitPacker {
    fields: &'static [Field],
    initial: u16,
}

impl BitPacker {
    pub const fn new(fields: &'static [Field], initial: u16) -> Self {
        Self { fields, initial }
    }

    /// `values` are given in field order.
    pub fn pack(&self, values: &[i32]) -> u16 {
        debug_assert_eq!(values.len(), self.fields.len(), "field/value count mismatch");
        let mut word = self.initial;
        for (field, &value) in self.fields.iter().zip(values) {
            let width = field.width();
            if !fits_signed(value, width) && !(0..1i64 << width).contains(&(value as i64)) {
                tracing::warn!(field = field.name, value, bits = width, "value truncated to field width");
            }
            let mut scratch = 0u16;
            scratch.view_bits_mut::<Lsb0>()[field.start as usize..=field.end as usize]
                .store_le(value as u16);
            word |= scratch;
        }
        word
    }
}
