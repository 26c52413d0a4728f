#![doc(issue_tracker_base_url = "https://github.com/chainbound/ovs-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Compilation of closed integer ranges into OpenFlow masked matches.
//!
//! OpenFlow tables can only match bit patterns (`field=value/mask`), not numeric ranges. A range
//! such as ports `1000-1999` is therefore split into a disjoint set of power-of-two aligned
//! blocks, each of which is expressible as a single masked match. See [`decompose`].

use thiserror::Error;

mod cover;
mod masked;
mod width;

pub use cover::{decompose, decompose_ports, Cover};
pub use masked::MaskedValue;
pub use width::BitWidth;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid range: low {low} is greater than high {high}")]
    InvalidRange { low: u64, high: u64 },
    #[error("value {value} does not fit in the {width} domain")]
    OutOfDomain { value: u64, width: BitWidth },
}

pub type Result<T> = std::result::Result<T, Error>;
