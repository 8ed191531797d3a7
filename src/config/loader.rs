// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ScriptOptions;
use crate::config::validate::validate_options;
use crate::errors::Result;

/// Load script options from a TOML file.
///
/// This only performs deserialization; use [`load_and_validate`] to also
/// reject a missing script path or zero-sized stream settings.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ScriptOptions> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let opts: ScriptOptions = toml::from_str(&contents)?;

    Ok(opts)
}

/// Load script options from a TOML file and validate them.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ScriptOptions> {
    let opts = load_from_path(path)?;
    validate_options(&opts)?;
    Ok(opts)
}

/// `fsx.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("fsx.toml")
}
