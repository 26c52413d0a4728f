//! Bridge, port and link management through `ovs-vsctl`, `ovs-ofctl` and `ip`.

use rustc_hash::FxHashMap;

use crate::{command::Executor, Error, Ovs, Result};

impl<E: Executor> Ovs<E> {
    /// Returns the OpenFlow port number of every port on the bridge, keyed by port name.
    ///
    /// Parsed from `ovs-ofctl show BRIDGE`. The bridge-internal `LOCAL` port is skipped.
    pub fn list_all_of_ports(&self, bridge: &str) -> Result<FxHashMap<String, u32>> {
        let mut cmd = self.tools.ofctl();
        cmd.args(["show", bridge]);

        parse_of_ports(&self.output(cmd)?)
    }

    /// Brings the link up with `ip link set IFACE up`.
    pub fn set_interface_up(&self, iface: &str) -> Result<()> {
        let mut cmd = self.tools.ip();
        cmd.args(["link", "set", iface, "up"]);

        self.execute(cmd)
    }

    /// Creates the bridge if it doesn't exist yet, and brings its link up.
    ///
    /// With `secure_fail_mode`, the bridge fail mode is set to `secure`: when the controller is
    /// unreachable, the bridge keeps forwarding by its flow table only instead of falling back to
    /// a learning switch.
    pub fn create_bridge(&self, name: &str, secure_fail_mode: bool) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--may-exist", "add-br", name]);
        if secure_fail_mode {
            cmd.args(["--", "set-fail-mode", name, "secure"]);
        }

        tracing::debug!(bridge = name, secure_fail_mode, "creating bridge");
        self.execute(cmd)?;
        self.set_interface_up(name)
    }

    /// Deletes the bridge. Deleting a missing bridge is not an error.
    pub fn delete_bridge(&self, name: &str) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--if-exists", "del-br", name]);

        self.execute(cmd)
    }

    /// Adds the interface to the bridge. An `ofport` of 0 lets Open vSwitch pick the OpenFlow
    /// port number.
    pub fn add_port(&self, bridge: &str, iface: &str, ofport: u32) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--may-exist", "add-port", bridge, iface]);
        if ofport != 0 {
            cmd.args(["--", "set", "interface", iface, &format!("ofport_request={ofport}")]);
        }

        self.execute(cmd)
    }

    /// Deletes the port from the bridge. Deleting a missing port is not an error.
    pub fn del_port(&self, bridge: &str, port: &str) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--if-exists", "del-port", bridge, port]);

        self.execute(cmd)
    }

    /// Adds a patch port to the bridge, connected to the patch port `peer` (usually on another
    /// bridge).
    pub fn add_patch_port(&self, bridge: &str, patch: &str, peer: &str, ofport: u32) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--may-exist", "add-port", bridge, patch])
            .args(["--", "set", "interface", patch, "type=patch"])
            .args(["--", "set", "interface", patch, &format!("options:peer={peer}")]);
        if ofport > 0 {
            cmd.args(["--", "set", "interface", patch, &format!("ofport_request={ofport}")]);
        }

        self.execute(cmd)
    }

    /// Adds a VXLAN tunnel port to the bridge.
    ///
    /// The tunnel key is taken from the flow (`in_key=flow`, `out_key=flow`) so it can be set with
    /// `set_field:KEY->tun_id`, and the outer header is sent with the don't-fragment bit.
    pub fn add_vxlan_port(
        &self,
        bridge: &str,
        port: &str,
        local_ip: &str,
        remote_ip: &str,
        ofport: u32,
    ) -> Result<()> {
        let mut cmd = self.tools.vsctl();
        cmd.args(["--may-exist", "add-port", bridge, port])
            .args(["--", "set", "interface", port, "type=vxlan"])
            .arg(format!("options:local_ip={local_ip}"))
            .arg(format!("options:remote_ip={remote_ip}"))
            .args(["options:in_key=flow", "options:out_key=flow", "options:df_default=true"]);
        if ofport > 0 {
            cmd.args(["--", "set", "interface", port, &format!("ofport_request={ofport}")]);
        }

        tracing::debug!(bridge, port, local_ip, remote_ip, "adding vxlan port");
        self.execute(cmd)
    }
}

/// Parses the port lines of `ovs-ofctl show`, e.g.
///
/// ```text
///  1(eth1): addr:52:54:00:12:34:56
///  LOCAL(br0): addr:52:54:00:12:34:57
/// ```
fn parse_of_ports(output: &str) -> Result<FxHashMap<String, u32>> {
    let mut ports = FxHashMap::default();

    for line in output.lines().map(str::trim) {
        if !line.contains(" addr:") || line.starts_with("LOCAL") {
            continue;
        }

        let head = line.split_once("):").map_or(line, |(head, _)| head);
        if let Some((number, name)) = head.split_once('(') {
            // A name containing '(' is ambiguous.
            if name.contains('(') {
                continue;
            }

            let number = number
                .parse()
                .map_err(|source| Error::PortNumber { line: line.to_owned(), source })?;
            ports.insert(name.to_owned(), number);
        }
    }

    Ok(ports)
}
