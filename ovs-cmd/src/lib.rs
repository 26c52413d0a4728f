#![doc(issue_tracker_base_url = "https://github.com/chainbound/ovs-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Thin wrappers around the `ip`, `ovs-vsctl` and `ovs-ofctl` programs.
//!
//! Every operation builds an argument list, hands it to an [`Executor`] and interprets the
//! output. The default executor, [`Runner`], spawns the program and waits for it; [`Recorder`]
//! captures command lines instead, which is what the tests use.
//!
//! ```no_run
//! use ovs_cmd::{Ovs, PortField, Tools};
//!
//! let ovs = Ovs::new(Tools::default().with_sudo("sudo"));
//! ovs.create_bridge("br0", true)?;
//! ovs.add_port("br0", "eth1", 1)?;
//!
//! // Drop TCP traffic to ports 1000-1999.
//! ovs.add_port_range_flows("br0", "priority=100,tcp", PortField::TcpDst, 1000, 1999, "drop")?;
//! # Ok::<(), ovs_cmd::Error>(())
//! ```

use std::{net::AddrParseError, process::Command};

pub mod bridge;
pub mod command;
pub mod config;
pub mod flow;
pub mod packet;

pub use command::{Executor, Output, Recorder, Reply, Runner};
pub use config::Tools;
pub use flow::{port_rule_masking, range_matches, PortField};
pub use packet::{normalize_mac, ArpRequest};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("command error: {0}")]
    Command(#[from] command::Error),
    #[error("mask error: {0}")]
    Mask(#[from] ovs_mask::Error),
    #[error("invalid port number in {line:?}: {source}")]
    PortNumber { line: String, source: std::num::ParseIntError },
    #[error("invalid mac address {0:?}")]
    InvalidMac(String),
    #[error("invalid IPv4 address {input:?}: {source}")]
    InvalidAddr { input: String, source: AddrParseError },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Handle to the Open vSwitch instance of the host.
///
/// Holds the [`Tools`] configuration and the [`Executor`] commands are run with. Bridge, port,
/// flow and packet operations live in the [`bridge`], [`flow`] and [`packet`] modules.
#[derive(Debug, Clone, Default)]
pub struct Ovs<E = Runner> {
    tools: Tools,
    executor: E,
}

impl Ovs {
    /// Creates a handle that spawns the configured programs.
    pub fn new(tools: Tools) -> Self {
        Self { tools, executor: Runner }
    }
}

impl<E: Executor> Ovs<E> {
    /// Creates a handle that runs commands through `executor`.
    pub fn with_executor(tools: Tools, executor: E) -> Self {
        Self { tools, executor }
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the command and returns its stdout.
    fn output(&self, cmd: Command) -> Result<String> {
        Ok(self.executor.execute(cmd)?.stdout)
    }

    /// Runs the command, discarding its output.
    fn execute(&self, cmd: Command) -> Result<()> {
        self.executor.execute(cmd)?;
        Ok(())
    }
}
