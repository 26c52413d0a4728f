//! Utilities for [`std::process::Command`].

use std::{
    collections::VecDeque,
    io,
    process::{self, Command},
};

use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty command provided")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("non-zero exit status ({}): {}", .0.status, .0.stderr.trim())]
    NonZero(Output),
}

#[derive(Debug, Clone)]
pub struct Output {
    pub status: process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl From<process::Output> for Output {
    fn from(value: process::Output) -> Self {
        Self {
            status: value.status,
            stdout: String::from_utf8_lossy(&value.stdout).to_string(),
            stderr: String::from_utf8_lossy(&value.stderr).to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Renders a command as the line a shell user would type, program and arguments separated by
/// single spaces.
pub fn render(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }

    line
}

/// Runs built commands. The seam between argument building and process spawning.
pub trait Executor {
    /// Runs the command to completion, failing if it exits with a non-zero status.
    fn execute(&self, cmd: Command) -> Result<Output>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, cmd: Command) -> Result<Output> {
        (**self).execute(cmd)
    }
}

/// Spawns commands as child processes and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Runner;

impl Runner {
    /// Runs the command provided as strings, separating args with whitespaces.
    pub fn by_str(cmd: &str) -> Result<Output> {
        let mut iter = cmd.split_ascii_whitespace();
        let program = iter.next().ok_or(Error::Empty)?;
        let mut cmd = Command::new(program);
        cmd.args(iter);

        Self::run(cmd)
    }

    /// Runs the command, capturing its stdout and stderr.
    pub fn run(mut cmd: Command) -> Result<Output> {
        cmd.stderr(process::Stdio::piped()).stdout(process::Stdio::piped());

        tracing::debug!(?cmd, "running command");

        let output: Output = cmd.spawn()?.wait_with_output()?.into();

        if !output.status.success() {
            tracing::debug!(?output.stderr, ?output.status, ?cmd, "command returned non-zero status");
            return Err(Error::NonZero(output));
        }

        Ok(output)
    }
}

impl Executor for Runner {
    fn execute(&self, cmd: Command) -> Result<Output> {
        Self::run(cmd)
    }
}

/// A canned reply for [`Recorder`].
#[derive(Debug, Clone)]
pub enum Reply {
    /// The command succeeds and prints the given stdout.
    Stdout(String),
    /// The command exits with the given code and stderr.
    Failure { code: i32, stderr: String },
}

/// An [`Executor`] that never spawns anything. It records every command line it is given and
/// answers with queued [`Reply`]s, or with an empty successful output once the queue is drained.
#[derive(Debug, Default)]
pub struct Recorder {
    lines: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next unanswered command.
    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Queues a successful reply printing `stdout`.
    pub fn stdout(self, stdout: impl Into<String>) -> Self {
        self.reply(Reply::Stdout(stdout.into()))
    }

    /// Queues a failed reply.
    pub fn failure(self, code: i32, stderr: impl Into<String>) -> Self {
        self.reply(Reply::Failure { code, stderr: stderr.into() })
    }

    /// Returns the command lines executed so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Executor for Recorder {
    fn execute(&self, cmd: Command) -> Result<Output> {
        let line = render(&cmd);
        tracing::debug!(%line, "recording command");
        self.lines.lock().push(line);

        match self.replies.lock().pop_front() {
            None => Ok(output(0, String::new(), String::new())),
            Some(Reply::Stdout(stdout)) => Ok(output(0, stdout, String::new())),
            Some(Reply::Failure { code, stderr }) => {
                Err(Error::NonZero(output(code, String::new(), stderr)))
            }
        }
    }
}

#[cfg(unix)]
fn output(code: i32, stdout: String, stderr: String) -> Output {
    use std::os::unix::process::ExitStatusExt;

    // Wait statuses carry the exit code in the second byte.
    Output { status: process::ExitStatus::from_raw(code << 8), stdout, stderr }
}

#[cfg(windows)]
fn output(code: i32, stdout: String, stderr: String) -> Output {
    use std::os::windows::process::ExitStatusExt;

    Output { status: process::ExitStatus::from_raw(code as u32), stdout, stderr }
}
