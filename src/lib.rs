// src/lib.rs

//! Run an F# script through its interpreter and talk to it as one
//! bidirectional byte stream.
//!
//! ```no_run
//! # async fn demo() -> fsx_stream::errors::Result<()> {
//! let mut stream = fsx_stream::spawn_script("hello.fsx")?;
//! stream.write("world\n")?;
//! stream.end();
//! let output = stream.read_to_end().await?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod locate;
pub mod logging;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ScriptOptions, default_config_path, load_from_path};

pub use crate::config::StreamOptions;
pub use crate::errors::FsxError;
pub use crate::exec::{ScriptStream, SpawnSpec, StreamEvent, spawn_script, spawn_script_with};
pub use crate::types::AdapterState;

/// High-level entry point used by `main.rs`.
///
/// Relays this process's stdin into the script and the script's stdout to
/// this process's stdout until the script finishes. Ctrl-C cancels the
/// script.
pub async fn run(args: CliArgs) -> Result<()> {
    let opts = options_from_args(&args)?;
    let mut stream = spawn_script(opts)?;

    let mut input = tokio::io::stdin();
    let mut output = tokio::io::stdout();
    let mut buf = vec![0u8; 8 * 1024];
    let mut input_open = true;
    let mut waiting_for_drain = false;
    let mut failure = None;

    loop {
        tokio::select! {
            read = input.read(&mut buf), if input_open && !waiting_for_drain => match read {
                Ok(0) => {
                    input_open = false;
                    stream.end();
                }
                Ok(n) => match stream.write(&buf[..n]) {
                    Ok(below) => waiting_for_drain = !below,
                    Err(err) => {
                        debug!(error = %err, "script no longer accepts input");
                        input_open = false;
                    }
                },
                Err(err) => {
                    debug!(error = %err, "reading stdin failed; ending script input");
                    input_open = false;
                    stream.end();
                }
            },

            event = stream.next_event() => match event {
                Some(StreamEvent::Data(bytes)) => {
                    output.write_all(&bytes).await?;
                }
                Some(StreamEvent::End) => output.flush().await?,
                Some(StreamEvent::Drain) => waiting_for_drain = false,
                Some(StreamEvent::Finish) | Some(StreamEvent::Close { .. }) => {}
                Some(StreamEvent::Error(err)) => {
                    failure.get_or_insert(err);
                }
                None => break,
            },

            Ok(()) = tokio::signal::ctrl_c() => {
                stream.cancel();
            }
        }
    }

    output.flush().await?;
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Merge the config file (`--config`, else `fsx.toml` when present) with CLI
/// overrides.
fn options_from_args(args: &CliArgs) -> Result<ScriptOptions> {
    let mut opts = match config_path(args, &default_config_path()) {
        Some(path) => load_from_path(&path)?,
        None => ScriptOptions::default(),
    };
    if let Some(script) = &args.script {
        opts.path = Some(script.into());
    }
    if let Some(executable) = &args.executable {
        opts.executable = Some(executable.into());
    }
    if !args.args.is_empty() {
        opts.args = args.args.clone();
    }
    Ok(opts)
}

fn config_path(args: &CliArgs, default: &Path) -> Option<PathBuf> {
    match &args.config {
        Some(path) => Some(PathBuf::from(path)),
        None if default.is_file() => Some(default.to_path_buf()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(script: Option<&str>, rest: &[&str]) -> CliArgs {
        CliArgs {
            script: script.map(str::to_string),
            config: None,
            executable: Some("/opt/fsharpi".to_string()),
            log_level: None,
            args: rest.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn cli_overrides_fill_options() {
        let opts = options_from_args(&args(Some("a.fsx"), &["1", "2"])).unwrap();
        assert_eq!(opts.path, Some(PathBuf::from("a.fsx")));
        assert_eq!(opts.executable, Some(PathBuf::from("/opt/fsharpi")));
        assert_eq!(opts.args, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn explicit_config_wins_over_default_file() {
        let default = tempfile::NamedTempFile::new().unwrap();
        let mut cli = args(Some("a.fsx"), &[]);
        cli.config = Some("custom.toml".to_string());

        assert_eq!(
            config_path(&cli, default.path()),
            Some(PathBuf::from("custom.toml"))
        );
    }

    #[test]
    fn default_config_is_used_only_when_present() {
        let default = tempfile::NamedTempFile::new().unwrap();
        let cli = args(Some("a.fsx"), &[]);

        assert_eq!(
            config_path(&cli, default.path()),
            Some(default.path().to_path_buf())
        );

        let missing = default.path().with_extension("absent");
        assert_eq!(config_path(&cli, &missing), None);
    }

    #[test]
    fn missing_script_is_left_for_validation() {
        let opts = options_from_args(&args(None, &[])).unwrap();
        assert_eq!(opts.path, None);
    }
}
