#![doc(issue_tracker_base_url = "https://github.com/chainbound/ovs-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use ovs_cmd::*;
pub use ovs_common::{constants, int_to_hex_string, int_to_string, parse_int, ParseIntError};
pub use ovs_mask::{decompose, decompose_ports, BitWidth, Cover, MaskedValue};

/// Range decomposition errors.
pub use ovs_mask::Error as MaskError;
