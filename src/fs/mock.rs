// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem that also records every probed path.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashSet<PathBuf>>>,
    probes: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf());
    }

    /// Paths passed to `exists`, in call order.
    pub fn probes(&self) -> Vec<PathBuf> {
        self.probes.lock().unwrap().clone()
    }

    fn record(&self, path: &Path) {
        self.probes.lock().unwrap().push(path.to_path_buf());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.record(path);
        self.files.lock().unwrap().contains(path)
    }
}
