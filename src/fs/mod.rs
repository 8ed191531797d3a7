// src/fs/mod.rs

//! Filesystem probe used by the executable locator.

use std::fmt::Debug;
use std::path::Path;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that asks the operating system.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
