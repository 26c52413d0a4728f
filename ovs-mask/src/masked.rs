use std::{fmt, ops::RangeInclusive};

use crate::width::{low_mask, BitWidth};

/// A masked match: all integers whose bits agree with `value` wherever `mask` has a 1-bit.
///
/// The value never has bits set outside the mask, and both fit in the width of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedValue {
    value: u64,
    mask: u64,
    width: BitWidth,
}

impl MaskedValue {
    /// Creates a new masked value. Returns `None` if either part does not fit in `width`, or if
    /// `value` has bits set outside of `mask`.
    pub const fn new(value: u64, mask: u64, width: BitWidth) -> Option<Self> {
        if !width.contains(value) || !width.contains(mask) || value & mask != value {
            return None;
        }

        Some(Self { value, mask, width })
    }

    /// Creates a match that selects exactly `value`.
    pub const fn exact(value: u64, width: BitWidth) -> Option<Self> {
        Self::new(value, width.max_value(), width)
    }

    /// An aligned block of `2^free_bits` integers starting at `start`. The caller guarantees that
    /// `start` is aligned to the block size.
    #[inline]
    pub(crate) const fn block(start: u64, free_bits: u32, width: BitWidth) -> Self {
        Self { value: start, mask: width.max_value() ^ low_mask(free_bits), width }
    }

    /// The fixed bit pattern.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// The mask; 1-bits are fixed, 0-bits are wildcarded.
    #[inline]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    #[inline]
    pub const fn width(&self) -> BitWidth {
        self.width
    }

    /// Number of wildcarded bits, i.e. zero bits of the mask within the width.
    #[inline]
    pub const fn free_bits(&self) -> u32 {
        self.width.bits() - self.mask.count_ones()
    }

    /// Number of integers matched. Returned as `u128` so a fully wildcarded 64-bit field fits.
    #[inline]
    pub const fn size(&self) -> u128 {
        1 << self.free_bits()
    }

    /// Returns true if `x` is matched.
    #[inline]
    pub const fn matches(&self, x: u64) -> bool {
        self.width.contains(x) && x & self.mask == self.value
    }

    /// Returns the matched integers as a range, if they are contiguous. That is the case when the
    /// wildcarded bits are exactly the low bits, as produced by [`crate::decompose`].
    pub const fn as_range(&self) -> Option<RangeInclusive<u64>> {
        let free = low_mask(self.free_bits());
        if self.mask | free != self.width.max_value() {
            return None;
        }

        Some(self.value..=self.value | free)
    }
}

impl fmt::Display for MaskedValue {
    /// Renders as `0xVALUE/0xMASK`, both zero-padded to the width of the field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.width.hex_digits();
        write!(f, "{:#0w$x}/{:#0w$x}", self.value, self.mask, w = digits + 2)
    }
}
