use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fsx_stream::fs::mock::MockFileSystem;
use fsx_stream::locate::{Locator, PathSearch, Platform};

/// PATH search over a fixed name → path table that records every lookup.
#[derive(Debug, Clone, Default)]
pub struct FakePathSearch {
    entries: HashMap<String, PathBuf>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl FakePathSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(name.to_string(), path.into());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl PathSearch for FakePathSearch {
    fn find(&self, name: &str) -> Result<PathBuf, which::Error> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.entries
            .get(name)
            .cloned()
            .ok_or(which::Error::CannotFindBinaryPath)
    }
}

/// Builder for a `Locator` over fake collaborators.
///
/// The search and filesystem handles stay shared with the built locator, so
/// tests can inspect them afterwards.
pub struct LocatorBuilder {
    platform: Platform,
    search: FakePathSearch,
    fs: MockFileSystem,
    program_files_x86: Option<PathBuf>,
}

impl LocatorBuilder {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            search: FakePathSearch::new(),
            fs: MockFileSystem::new(),
            program_files_x86: None,
        }
    }

    pub fn on_path(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.search = self.search.with_entry(name, path);
        self
    }

    pub fn program_files_x86(mut self, dir: impl Into<PathBuf>) -> Self {
        self.program_files_x86 = Some(dir.into());
        self
    }

    pub fn existing_file(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_file(path);
        self
    }

    pub fn search(&self) -> FakePathSearch {
        self.search.clone()
    }

    pub fn fs(&self) -> MockFileSystem {
        self.fs.clone()
    }

    pub fn build(self) -> Locator {
        let locator = Locator::new(self.search, self.fs).for_platform(self.platform);
        match self.program_files_x86 {
            Some(dir) => locator.with_program_files_x86(dir),
            None => locator,
        }
    }
}
