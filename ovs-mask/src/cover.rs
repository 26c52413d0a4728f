use std::{ops::RangeInclusive, slice};

use crate::{
    masked::MaskedValue,
    width::{low_mask, BitWidth},
    Error, Result,
};

/// An ordered, disjoint set of masked values whose union is exactly a closed integer range.
///
/// Entries are sorted by value, from the low end of the range to the high end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    range: RangeInclusive<u64>,
    width: BitWidth,
    blocks: Vec<MaskedValue>,
}

impl Cover {
    /// The range this cover matches.
    pub const fn range(&self) -> &RangeInclusive<u64> {
        &self.range
    }

    pub const fn width(&self) -> BitWidth {
        self.width
    }

    /// Number of masked values. Never zero.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false, a cover matches at least one integer.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, MaskedValue> {
        self.blocks.iter()
    }

    pub fn as_slice(&self) -> &[MaskedValue] {
        &self.blocks
    }

    pub fn into_vec(self) -> Vec<MaskedValue> {
        self.blocks
    }

    /// Returns true if `x` is matched by any entry.
    pub fn contains(&self, x: u64) -> bool {
        // The entries are sorted, so only the last one starting at or before `x` can match.
        let idx = self.blocks.partition_point(|mv| mv.value() <= x);
        idx > 0 && self.blocks[idx - 1].matches(x)
    }
}

impl<'a> IntoIterator for &'a Cover {
    type Item = &'a MaskedValue;
    type IntoIter = slice::Iter<'a, MaskedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Cover {
    type Item = MaskedValue;
    type IntoIter = std::vec::IntoIter<MaskedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

/// Decomposes the closed range `low..=high` of a `width`-bit domain into masked values.
///
/// The range is scanned from `low` upwards. At every step the largest power-of-two block that is
/// both aligned at the cursor and contained in what is left of the range is emitted, so the
/// result is deterministic and uses the fewest blocks possible. The loop runs at most
/// `2 * width` times.
///
/// ## Errors
/// - [`Error::OutOfDomain`] if `low` or `high` do not fit in `width` bits.
/// - [`Error::InvalidRange`] if `low > high`.
///
/// ## Example
/// ```
/// use ovs_mask::{decompose, BitWidth};
///
/// let cover = decompose(1000, 1999, BitWidth::PORT).unwrap();
/// let rules: Vec<String> = cover.iter().map(ToString::to_string).collect();
/// assert_eq!(rules[0], "0x03e8/0xfff8");
/// assert_eq!(rules.len(), 7);
/// ```
pub fn decompose(low: u64, high: u64, width: BitWidth) -> Result<Cover> {
    for value in [low, high] {
        if !width.contains(value) {
            return Err(Error::OutOfDomain { value, width });
        }
    }

    if low > high {
        return Err(Error::InvalidRange { low, high });
    }

    let mut blocks = Vec::with_capacity(2 * width.bits() as usize);
    let mut cursor = low;

    loop {
        let free_bits = block_bits(cursor, high, width);
        // `cursor` is aligned, so or-ing in the free bits yields the last integer of the block.
        let last = cursor | low_mask(free_bits);

        tracing::trace!(cursor, last, free_bits, "emitting block");
        blocks.push(MaskedValue::block(cursor, free_bits, width));

        if last >= high {
            break;
        }

        cursor = last + 1;
    }

    Ok(Cover { range: low..=high, width, blocks })
}

/// Decomposes a range of 16-bit transport ports.
///
/// Shorthand for [`decompose`] with [`BitWidth::PORT`]; only [`Error::InvalidRange`] can occur.
pub fn decompose_ports(low: u16, high: u16) -> Result<Cover> {
    decompose(low.into(), high.into(), BitWidth::PORT)
}

/// Returns the size, as a power of two, of the largest block starting at `cursor` that is
/// aligned and does not go past `high`.
#[inline]
fn block_bits(cursor: u64, high: u64, width: BitWidth) -> u32 {
    let alignment = cursor.trailing_zeros().min(width.bits());
    let containment = match (high - cursor).checked_add(1) {
        Some(remaining) => bit_length(remaining) - 1,
        // The whole 64-bit domain is left.
        None => u64::BITS,
    };

    alignment.min(containment)
}

#[inline]
const fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}
