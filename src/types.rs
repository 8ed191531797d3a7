// src/types.rs

use std::fmt;

/// One of the three byte channels attached to the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildChannel {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for ChildChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildChannel::Stdin => f.write_str("stdin"),
            ChildChannel::Stdout => f.write_str("stdout"),
            ChildChannel::Stderr => f.write_str("stderr"),
        }
    }
}

/// Which direction of the caller-facing stream has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfClose {
    /// The caller's write side finished; child stdin is closed.
    WriteEnd,
    /// Child stdout ended; no more data will be read.
    ReadEnd,
}

/// Lifecycle of one script invocation as seen by the caller.
///
/// - `Spawning` while options are resolved and the process is started.
/// - `Active` once the child handles are attached.
/// - `HalfClosed` after one direction completed.
/// - `Closed` after stdout ended and the process exited with status 0.
/// - `Failed` after a non-zero exit, a channel error or cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterState {
    Spawning,
    Active,
    HalfClosed(HalfClose),
    Closed,
    Failed(String),
}

impl AdapterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdapterState::Closed | AdapterState::Failed(_))
    }
}
