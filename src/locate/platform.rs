// src/locate/platform.rs

use std::fmt;

use crate::errors::{FsxError, Result};

/// Interpreter name searched on PATH on Linux and macOS (Mono).
pub const UNIX_EXECUTABLE: &str = "fsharpi";

/// Interpreter name searched on PATH on Windows.
pub const WINDOWS_EXECUTABLE: &str = "fsi";

/// Operating environments the locator knows how to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

/// How the interpreter is discovered on a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// Search PATH for the given name; fail if absent.
    Path(&'static str),
    /// Search PATH for the given name, then try the default install location.
    PathThenDefaultInstall(&'static str),
}

impl Platform {
    /// Platform of the running process.
    pub fn current() -> Self {
        Self::from_rust_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_rust_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Map a `uname`-style OS type such as `Linux`, `Darwin` or `Windows_NT`.
    pub fn from_os_type(os_type: &str) -> Self {
        match os_type {
            "Linux" => Platform::Linux,
            "Darwin" => Platform::MacOs,
            "Windows_NT" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Discovery strategy for this platform.
    ///
    /// Unknown platforms are rejected here, before any search is attempted.
    pub fn discovery(&self) -> Result<Discovery> {
        match self {
            Platform::Linux | Platform::MacOs => Ok(Discovery::Path(UNIX_EXECUTABLE)),
            Platform::Windows => Ok(Discovery::PathThenDefaultInstall(WINDOWS_EXECUTABLE)),
            Platform::Other(name) => Err(FsxError::UnsupportedPlatform(name.clone())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => f.write_str("Linux"),
            Platform::MacOs => f.write_str("Darwin"),
            Platform::Windows => f.write_str("Windows_NT"),
            Platform::Other(name) => f.write_str(name),
        }
    }
}
