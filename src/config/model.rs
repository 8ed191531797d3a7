// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Options for one script invocation.
///
/// Mirrors the TOML file accepted by [`crate::config::load_from_path`]:
///
/// ```toml
/// path = "build.fsx"
/// executable = "/usr/bin/fsharpi"
/// args = ["--release"]
///
/// [stream]
/// high_water_mark = 16384
/// ```
///
/// Only `path` is required; it is kept optional here so that a missing path
/// is reported as a configuration error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Script handed to the interpreter as its first argument.
    pub path: Option<PathBuf>,

    /// Interpreter override. When absent the executable is located on PATH.
    pub executable: Option<PathBuf>,

    /// Extra arguments appended after the script path.
    pub args: Vec<String>,

    /// Flow-control tuning.
    pub stream: StreamOptions,
}

impl ScriptOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stream(mut self, stream: StreamOptions) -> Self {
        self.stream = stream;
        self
    }
}

impl From<&str> for ScriptOptions {
    fn from(path: &str) -> Self {
        ScriptOptions::new(path)
    }
}

impl From<String> for ScriptOptions {
    fn from(path: String) -> Self {
        ScriptOptions::new(path)
    }
}

impl From<&Path> for ScriptOptions {
    fn from(path: &Path) -> Self {
        ScriptOptions::new(path)
    }
}

impl From<PathBuf> for ScriptOptions {
    fn from(path: PathBuf) -> Self {
        ScriptOptions::new(path)
    }
}

/// `[stream]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Queued-but-unwritten stdin bytes at which `write` starts returning
    /// `false`.
    pub high_water_mark: usize,

    /// Stdout chunks buffered ahead of the caller before the stdout pump
    /// stops reading.
    pub read_ahead: usize,

    /// Maximum bytes read from stdout per chunk.
    pub read_chunk_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            high_water_mark: 16 * 1024,
            read_ahead: 1,
            read_chunk_size: 8 * 1024,
        }
    }
}
