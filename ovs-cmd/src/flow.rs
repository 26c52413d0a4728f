//! OpenFlow table management through `ovs-ofctl`, and rendering of range matches.
//!
//! OpenFlow cannot match a numeric range, so a match such as "TCP destination ports 1000-1999"
//! is installed as one flow per block of the range's [`Cover`]:
//!
//! ```text
//! priority=100,tcp,tcp_dst=0x03e8/0xfff8,actions=drop
//! priority=100,tcp,tcp_dst=0x03f0/0xfff0,actions=drop
//! ...
//! ```

use std::fmt;

use ovs_mask::{decompose_ports, Cover};

use crate::{command::Executor, Ovs, Result};

/// Transport port match fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortField {
    /// `tp_src`, requires `tcp`, `udp` or `sctp` in the match.
    TpSrc,
    /// `tp_dst`, requires `tcp`, `udp` or `sctp` in the match.
    TpDst,
    TcpSrc,
    TcpDst,
    UdpSrc,
    UdpDst,
}

impl PortField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TpSrc => "tp_src",
            Self::TpDst => "tp_dst",
            Self::TcpSrc => "tcp_src",
            Self::TcpDst => "tcp_dst",
            Self::UdpSrc => "udp_src",
            Self::UdpDst => "udp_dst",
        }
    }
}

impl fmt::Display for PortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders every block of the port range `low..=high` as `0xVALUE/0xMASK`.
///
/// ```
/// let masks = ovs_cmd::port_rule_masking(1000, 1999).unwrap();
/// assert_eq!(masks.len(), 7);
/// assert_eq!(masks[0], "0x03e8/0xfff8");
/// ```
pub fn port_rule_masking(low: u16, high: u16) -> Result<Vec<String>> {
    Ok(decompose_ports(low, high)?.iter().map(ToString::to_string).collect())
}

/// Renders every block of the cover as a `field=0xVALUE/0xMASK` match.
pub fn range_matches(field: &str, cover: &Cover) -> Vec<String> {
    cover.iter().map(|mv| format!("{field}={mv}")).collect()
}

/// Joins the non-empty match fields into one match.
fn join_match(base: &str, extra: &str) -> String {
    match (base.is_empty(), extra.is_empty()) {
        (true, _) => extra.to_owned(),
        (_, true) => base.to_owned(),
        _ => format!("{base},{extra}"),
    }
}

impl<E: Executor> Ovs<E> {
    /// Returns the flows of the bridge, one per line of `ovs-ofctl dump-flows`.
    ///
    /// With `names`, ports are printed by name instead of number. With `stats`, every flow carries
    /// its `duration`, `n_packets` and `n_bytes` counters.
    pub fn get_all_flows(&self, bridge: &str, names: bool, stats: bool) -> Result<Vec<String>> {
        let mut cmd = self.tools.ofctl();
        cmd.arg(if names { "--names" } else { "--no-names" })
            .arg(if stats { "--stats" } else { "--no-stats" })
            .args(["dump-flows", bridge]);

        let output = self.output(cmd)?;
        Ok(output.lines().filter(|line| !line.trim().is_empty()).map(str::to_owned).collect())
    }

    /// Adds the flows one by one, stopping at the first failure.
    pub fn add_flows<I, S>(&self, bridge: &str, flows: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for flow in flows {
            let mut cmd = self.tools.ofctl();
            cmd.args(["add-flow", bridge, flow.as_ref()]);
            self.execute(cmd)?;
        }

        Ok(())
    }

    /// Deletes the flows matching each match, stopping at the first failure.
    ///
    /// Matches are loose: every flow whose match is a superset of the given one is deleted.
    pub fn del_flows<I, S>(&self, bridge: &str, matches: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for m in matches {
            let mut cmd = self.tools.ofctl();
            cmd.args(["del-flows", bridge, m.as_ref()]);
            self.execute(cmd)?;
        }

        Ok(())
    }

    /// Deletes the flows whose match and priority are exactly the given ones.
    pub fn del_flows_strict<I, S>(&self, bridge: &str, priority: u16, matches: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for m in matches {
            let m = join_match(&format!("priority={priority}"), m.as_ref());
            let mut cmd = self.tools.ofctl();
            cmd.args(["--strict", "del-flows", bridge, &m]);
            self.execute(cmd)?;
        }

        Ok(())
    }

    /// Installs one flow per block of the port range, each with the given base match and actions.
    ///
    /// `base` holds the other match fields, e.g. `priority=100,tcp`. Returns the number of flows
    /// added. The range is validated before anything is installed.
    pub fn add_port_range_flows(
        &self,
        bridge: &str,
        base: &str,
        field: PortField,
        low: u16,
        high: u16,
        actions: &str,
    ) -> Result<usize> {
        let cover = decompose_ports(low, high)?;
        let flows: Vec<_> = range_matches(field.as_str(), &cover)
            .iter()
            .map(|m| format!("{},actions={actions}", join_match(base, m)))
            .collect();

        tracing::debug!(bridge, %field, low, high, n = flows.len(), "adding port range flows");
        self.add_flows(bridge, &flows)?;
        Ok(flows.len())
    }

    /// Deletes the flows installed by [`Self::add_port_range_flows`] with the same arguments.
    pub fn del_port_range_flows(
        &self,
        bridge: &str,
        base: &str,
        field: PortField,
        low: u16,
        high: u16,
    ) -> Result<()> {
        let cover = decompose_ports(low, high)?;
        let matches = range_matches(field.as_str(), &cover);

        self.del_flows(bridge, matches.iter().map(|m| join_match(base, m)))
    }
}
