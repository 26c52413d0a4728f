use std::process::Command;

use ovs_common::constants::{IP_CMD, OFCTL_CMD, VSCTL_CMD};

/// Programs used to talk to the host and to Open vSwitch.
///
/// By default the programs are looked up in `PATH` and run as the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    /// Program used to manage links. Default: `ip`.
    pub ip: String,
    /// Program used to manage OpenFlow tables. Default: `ovs-ofctl`.
    pub ofctl: String,
    /// Program used to manage bridges and ports. Default: `ovs-vsctl`.
    pub vsctl: String,
    /// Optional privilege escalation wrapper every command is run through, e.g. `sudo`.
    pub sudo: Option<String>,
}

impl Tools {
    /// Sets the `ip` program.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Sets the `ovs-ofctl` program.
    pub fn with_ofctl(mut self, ofctl: impl Into<String>) -> Self {
        self.ofctl = ofctl.into();
        self
    }

    /// Sets the `ovs-vsctl` program.
    pub fn with_vsctl(mut self, vsctl: impl Into<String>) -> Self {
        self.vsctl = vsctl.into();
        self
    }

    /// Runs every command through `sudo`, e.g. `"sudo"` or `"doas"`.
    pub fn with_sudo(mut self, sudo: impl Into<String>) -> Self {
        self.sudo = Some(sudo.into());
        self
    }

    pub(crate) fn ip(&self) -> Command {
        self.command(&self.ip)
    }

    pub(crate) fn ofctl(&self) -> Command {
        self.command(&self.ofctl)
    }

    pub(crate) fn vsctl(&self) -> Command {
        self.command(&self.vsctl)
    }

    fn command(&self, program: &str) -> Command {
        match &self.sudo {
            Some(sudo) => {
                let mut cmd = Command::new(sudo);
                cmd.arg(program);
                cmd
            }
            None => Command::new(program),
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ip: IP_CMD.to_string(),
            ofctl: OFCTL_CMD.to_string(),
            vsctl: VSCTL_CMD.to_string(),
            sudo: None,
        }
    }
}
