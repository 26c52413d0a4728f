use std::{borrow::Cow, num::IntErrorKind};

use thiserror::Error;

/// Error returned by [`parse_int`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIntError {
    #[error("invalid integer {input:?}: {source}")]
    Digits { input: String, source: std::num::ParseIntError },
    #[error("misplaced sign in {0:?}")]
    Sign(String),
    #[error("misplaced digit separator in {0:?}")]
    Separator(String),
}

impl ParseIntError {
    /// Returns true if the input was syntactically valid but did not fit in an `i64`.
    pub fn is_overflow(&self) -> bool {
        match self {
            Self::Digits { source, .. } => matches!(
                source.kind(),
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
            ),
            Self::Sign(_) | Self::Separator(_) => false,
        }
    }
}

/// Parses a decimal, hexadecimal (`0x`), octal (`0o` or a leading `0`) or binary (`0b`) integer,
/// with an optional sign. Surrounding whitespace is ignored.
///
/// Digits may be grouped with `_` separators (`1_000`, `0x_3e8`). A separator must sit between
/// two digits or right after the base prefix.
///
/// This is the format `ovs-ofctl` prints numbers in, e.g. `priority=100` or `cookie=0x2a`.
pub fn parse_int(s: &str) -> Result<i64, ParseIntError> {
    let trimmed = s.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = split_radix(unsigned);
    let prefixed = digits.len() != unsigned.len();
    let digits =
        strip_separators(digits, prefixed).ok_or_else(|| ParseIntError::Separator(s.to_owned()))?;
    // `from_str_radix` would accept a sign after the prefix, e.g. "0x-1".
    if digits.starts_with(['+', '-']) {
        return Err(ParseIntError::Sign(s.to_owned()));
    }

    let result = if negative {
        i64::from_str_radix(&format!("-{digits}"), radix)
    } else {
        i64::from_str_radix(&digits, radix)
    };

    result.map_err(|source| ParseIntError::Digits { input: s.to_owned(), source })
}

fn strip_separators(digits: &str, prefixed: bool) -> Option<Cow<'_, str>> {
    if !digits.contains('_') {
        return Some(Cow::Borrowed(digits));
    }
    if digits.ends_with('_') || digits.contains("__") || (!prefixed && digits.starts_with('_')) {
        return None;
    }

    Some(Cow::Owned(digits.replace('_', "")))
}

fn split_radix(s: &str) -> (u32, &str) {
    const PREFIXES: [(&str, u32); 6] =
        [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];

    for (prefix, radix) in PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            return (radix, rest);
        }
    }

    match s.strip_prefix('0') {
        Some(rest) if !rest.is_empty() => (8, rest),
        _ => (10, s),
    }
}

/// Formats the integer as decimal.
#[inline]
pub fn int_to_string(i: i64) -> String {
    i.to_string()
}

/// Formats the integer as lowercase hexadecimal with a `0x` prefix, e.g. `0x3e8`.
pub fn int_to_hex_string(i: i64) -> String {
    if i < 0 {
        format!("-{:#x}", i.unsigned_abs())
    } else {
        format!("{i:#x}")
    }
}

pub mod constants {
    /// Program used to manage links.
    pub const IP_CMD: &str = "ip";
    /// Program used to manage OpenFlow tables.
    pub const OFCTL_CMD: &str = "ovs-ofctl";
    /// Program used to manage the Open vSwitch database (bridges, ports, interfaces).
    pub const VSCTL_CMD: &str = "ovs-vsctl";

    /// The Ethernet broadcast address.
    pub const BROADCAST_MAC: &str = "ff:ff:ff:ff:ff:ff";

    /// L2 protocol numbers, as matched by `dl_type`.
    pub mod ether_type {
        pub const ARP: u16 = 0x0806;
        pub const IPV4: u16 = 0x0800;
        pub const IPV6: u16 = 0x86dd;
        /// 802.1Q VLAN tag.
        pub const VLAN: u16 = 0x8100;
    }

    /// L3 protocol numbers, as matched by `nw_proto`.
    pub mod ip_proto {
        pub const ICMP: u8 = 1;
        pub const TCP: u8 = 6;
        pub const UDP: u8 = 17;
        pub const GRE: u8 = 47;
    }

    /// Reserved OpenFlow actions.
    pub mod action {
        pub const DROP: &str = "drop";
        pub const LOCAL: &str = "local";
        pub const FLOOD: &str = "flood";
        pub const NORMAL: &str = "normal";
    }
}
