// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `fsx`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fsx",
    version,
    about = "Run an F# script, piping this process's stdin and stdout through it.",
    long_about = None
)]
pub struct CliArgs {
    /// Script to run. Overrides `path` from the config file.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<String>,

    /// Options file (TOML) with `path`, `executable`, `args` and `[stream]`.
    /// Defaults to `fsx.toml` in the working directory when that exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Interpreter to use instead of searching PATH.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FSX_LOG` is used, else `warn`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Extra arguments passed to the script, after `--`.
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
