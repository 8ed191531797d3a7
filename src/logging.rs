// src/logging.rs

//! `tracing-subscriber` setup for the `fsx` binary.
//!
//! The filter comes from `--log-level` when given, otherwise from `FSX_LOG`
//! (any `EnvFilter` directive, e.g. `debug` or `fsx_stream::exec=trace`),
//! otherwise `warn`. Output goes to stderr; stdout belongs to the script.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "FSX_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.directive());
    }
    env.map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_environment() {
        let filter = build_filter(Some(LogLevel::Trace), Some("error"));
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn environment_directives_are_used_verbatim() {
        let filter = build_filter(None, Some(" fsx_stream::exec=debug "));
        assert_eq!(filter.to_string(), "fsx_stream::exec=debug");
    }

    #[test]
    fn missing_or_bad_environment_falls_back_to_warn() {
        assert_eq!(build_filter(None, None).to_string(), "warn");
        assert_eq!(build_filter(None, Some("")).to_string(), "warn");
        assert_eq!(build_filter(None, Some("fsx_stream=loudest")).to_string(), "warn");
    }
}
