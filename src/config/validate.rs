// src/config/validate.rs

use crate::config::model::ScriptOptions;
use crate::errors::{FsxError, Result};

/// Check options before any lookup or spawn happens.
pub fn validate_options(opts: &ScriptOptions) -> Result<()> {
    ensure_has_path(opts)?;
    validate_stream(opts)?;
    Ok(())
}

fn ensure_has_path(opts: &ScriptOptions) -> Result<()> {
    match opts.path.as_deref() {
        Some(path) if !path.as_os_str().is_empty() => Ok(()),
        _ => Err(FsxError::missing_script_path()),
    }
}

fn validate_stream(opts: &ScriptOptions) -> Result<()> {
    let stream = &opts.stream;
    for (name, value) in [
        ("high_water_mark", stream.high_water_mark),
        ("read_ahead", stream.read_ahead),
        ("read_chunk_size", stream.read_chunk_size),
    ] {
        if value == 0 {
            return Err(FsxError::InvalidConfiguration(format!(
                "[stream].{name} must be >= 1 (got 0)"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamOptions;

    #[test]
    fn empty_path_is_rejected() {
        let err = validate_options(&ScriptOptions::new("")).unwrap_err();
        assert_eq!(err.to_string(), "Path to script (*.fsx file) is required");
    }

    #[test]
    fn zero_read_ahead_is_rejected() {
        let opts = ScriptOptions::new("a.fsx").with_stream(StreamOptions {
            read_ahead: 0,
            ..StreamOptions::default()
        });

        match validate_options(&opts) {
            Err(FsxError::InvalidConfiguration(msg)) => assert!(msg.contains("read_ahead")),
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }
}
