use std::fmt;

/// The number of bits of the integer domain a match field lives in.
///
/// All values and masks of a field with width `w` are bounded to `[0, 2^w - 1]`. Widths from
/// 1 up to 64 bits are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitWidth(u32);

impl BitWidth {
    /// 8-bit fields, e.g. `nw_proto` or `nw_tos`.
    pub const U8: Self = Self(8);
    /// 16-bit fields: transport ports (`tp_src`, `tp_dst`), `dl_type`, `dl_vlan`.
    pub const PORT: Self = Self(16);
    /// 32-bit fields, e.g. `reg0`..`reg15` or IPv4 addresses.
    pub const U32: Self = Self(32);
    /// 64-bit fields, e.g. `metadata` or `tun_id`.
    pub const U64: Self = Self(64);

    /// Creates a new width. Returns `None` if `bits` is zero or larger than 64.
    pub const fn new(bits: u32) -> Option<Self> {
        if bits == 0 || bits > u64::BITS {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Returns the number of bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the largest value in the domain, which is also the "all ones" mask.
    #[inline]
    pub const fn max_value(self) -> u64 {
        low_mask(self.0)
    }

    /// Returns true if `value` fits in the domain.
    #[inline]
    pub const fn contains(self, value: u64) -> bool {
        value <= self.max_value()
    }

    /// Number of hex digits needed to render any value of the domain.
    #[inline]
    pub const fn hex_digits(self) -> usize {
        self.0.div_ceil(4) as usize
    }
}

impl TryFrom<u32> for BitWidth {
    type Error = u32;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits).ok_or(bits)
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.0)
    }
}

/// Returns a value with the low `bits` bits set. Saturates at 64 bits.
#[inline]
pub(crate) const fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}
