// src/locate/mod.rs

//! Interpreter executable discovery.
//!
//! - [`platform`] defines the closed set of supported platforms and the
//!   discovery strategy each one uses.
//! - [`search`] abstracts PATH lookup so tests can replace it.
//!
//! The [`Locator`] ties those together with a [`FileSystem`] probe used for
//! the Windows default install location.

pub mod platform;
pub mod search;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{FsxError, Result};
use crate::fs::{FileSystem, RealFileSystem};

pub use platform::{Discovery, Platform};
pub use search::{PathSearch, WhichSearch};

/// Environment variable holding the 32-bit program files directory.
pub const PROGRAM_FILES_X86_VAR: &str = "PROGRAMFILES(X86)";

/// Path of `fsi.exe` below the 32-bit program files directory for the
/// F# 3.0 SDK.
pub fn default_install_location(program_files_x86: &Path) -> PathBuf {
    program_files_x86
        .join("Microsoft SDKs")
        .join("F#")
        .join("3.0")
        .join("Framework")
        .join("v4.0")
        .join("fsi.exe")
}

/// Resolves the interpreter executable for a platform.
#[derive(Debug)]
pub struct Locator {
    search: Box<dyn PathSearch>,
    fs: Box<dyn FileSystem>,
    platform: Platform,
    program_files_x86: Option<PathBuf>,
}

impl Locator {
    /// Locator using the real PATH, the real filesystem and the
    /// `PROGRAMFILES(X86)` environment variable.
    pub fn system() -> Self {
        Self {
            search: Box::new(WhichSearch),
            fs: Box::new(RealFileSystem),
            platform: Platform::current(),
            program_files_x86: std::env::var_os(PROGRAM_FILES_X86_VAR).map(PathBuf::from),
        }
    }

    /// Locator with injected collaborators for the running platform and no
    /// program files directory.
    pub fn new(search: impl PathSearch + 'static, fs: impl FileSystem + 'static) -> Self {
        Self {
            search: Box::new(search),
            fs: Box::new(fs),
            platform: Platform::current(),
            program_files_x86: None,
        }
    }

    pub fn for_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_program_files_x86(mut self, dir: impl Into<PathBuf>) -> Self {
        self.program_files_x86 = Some(dir.into());
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Locate the interpreter for the platform this locator was built for.
    pub fn locate_configured(&self) -> Result<PathBuf> {
        self.locate(&self.platform)
    }

    /// Locate the interpreter for `platform`.
    ///
    /// On Windows a PATH miss falls back to the default install location; if
    /// that does not exist either, the original PATH error is returned.
    pub fn locate(&self, platform: &Platform) -> Result<PathBuf> {
        match platform.discovery()? {
            Discovery::Path(name) => self.search_path(name),
            Discovery::PathThenDefaultInstall(name) => match self.search_path(name) {
                Ok(path) => Ok(path),
                Err(err) => match self.default_install() {
                    Some(fallback) => {
                        debug!(
                            %platform,
                            path = %fallback.display(),
                            "interpreter not on PATH; using default install location"
                        );
                        Ok(fallback)
                    }
                    None => Err(err),
                },
            },
        }
    }

    fn search_path(&self, name: &str) -> Result<PathBuf> {
        let path = self
            .search
            .find(name)
            .map_err(|source| FsxError::ExecutableNotFound {
                name: name.to_string(),
                source,
            })?;
        debug!(name, path = %path.display(), "found interpreter on PATH");
        Ok(path)
    }

    fn default_install(&self) -> Option<PathBuf> {
        let candidate = default_install_location(self.program_files_x86.as_deref()?);
        self.fs.exists(&candidate).then_some(candidate)
    }
}
