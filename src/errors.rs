// src/errors.rs

//! Crate-wide error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ChildChannel;

/// Message used when no script path was supplied.
pub const MISSING_SCRIPT_PATH: &str = "Path to script (*.fsx file) is required";

#[derive(Error, Debug)]
pub enum FsxError {
    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("OS not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("unable to find '{name}' executable: {source}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to spawn {}: {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Low-level I/O failure on child stdin or stdout, passed through as-is.
    #[error("{source}")]
    Channel {
        channel: ChildChannel,
        #[source]
        source: io::Error,
    },

    #[error("non-zero exit code {code}\n  running: {command}\n\n  {diagnostics}")]
    ProcessExit {
        code: i32,
        command: String,
        diagnostics: String,
    },

    #[error("script process cancelled")]
    Cancelled,

    #[error("write after end")]
    WriteAfterEnd,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FsxError {
    pub(crate) fn missing_script_path() -> Self {
        FsxError::InvalidConfiguration(MISSING_SCRIPT_PATH.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FsxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_exit_message_lists_code_command_and_stderr() {
        let err = FsxError::ProcessExit {
            code: 1,
            command: "fsharpi build.fsx --fast".to_string(),
            diagnostics: "boom".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "non-zero exit code 1\n  running: fsharpi build.fsx --fast\n\n  boom"
        );
    }

    #[test]
    fn channel_error_displays_source_verbatim() {
        let err = FsxError::Channel {
            channel: ChildChannel::Stdin,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(err.to_string(), "pipe closed");
    }
}
