// src/locate/search.rs

use std::fmt::Debug;
use std::path::PathBuf;

/// Executable search on the system PATH.
pub trait PathSearch: Send + Sync + Debug {
    fn find(&self, name: &str) -> Result<PathBuf, which::Error>;
}

/// Production search backed by the `which` crate.
#[derive(Debug, Clone, Default)]
pub struct WhichSearch;

impl PathSearch for WhichSearch {
    fn find(&self, name: &str) -> Result<PathBuf, which::Error> {
        which::which(name)
    }
}
