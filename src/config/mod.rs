// src/config/mod.rs

//! Script invocation options.
//!
//! Responsibilities:
//! - Define the TOML-backed options model (`model.rs`).
//! - Load an options file from disk (`loader.rs`).
//! - Validate the options before anything is spawned (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ScriptOptions, StreamOptions};
pub use validate::validate_options;
