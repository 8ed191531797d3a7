// src/exec/backend.rs

//! Pluggable process spawn abstraction.
//!
//! The stream adapter talks to a `Spawner` instead of `tokio::process`
//! directly. Production code uses [`TokioSpawner`]; tests provide a spawner
//! whose channels are in-memory pipes they can drive by hand.

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};

pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Exit notification and kill switch for a spawned child.
pub trait ChildExit: Send {
    /// Resolve with the exit status code once the child terminates.
    ///
    /// Termination without a code (e.g. by signal) is reported as `-1`.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<i32>> + Send + '_>>;

    /// Forcibly terminate the child.
    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>>;
}

/// The three byte channels and the exit notification of one child.
pub struct ChildHandles {
    pub stdin: BoxedWriter,
    pub stdout: BoxedReader,
    pub stderr: BoxedReader,
    pub exit: Box<dyn ChildExit>,
}

/// Trait abstracting how the interpreter process is started.
pub trait Spawner: Send + Sync {
    /// Start `executable` with `argv` and return its piped channels.
    fn spawn(&self, executable: &Path, argv: &[String]) -> io::Result<ChildHandles>;
}

/// Real spawner used in production, backed by `tokio::process::Command`.
///
/// Children are killed when their handles are dropped.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawner;

impl Spawner for TokioSpawner {
    fn spawn(&self, executable: &Path, argv: &[String]) -> io::Result<ChildHandles> {
        let mut child = Command::new(executable)
            .args(argv)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        Ok(ChildHandles {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit: Box::new(TokioChildExit { child }),
        })
    }
}

fn missing_pipe(name: &str) -> io::Error {
    io::Error::other(format!("child {name} was not captured"))
}

struct TokioChildExit {
    child: Child,
}

impl ChildExit for TokioChildExit {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<i32>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(status.code().unwrap_or(-1))
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(self.child.kill())
    }
}
