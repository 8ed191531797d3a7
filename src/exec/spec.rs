// src/exec/spec.rs

use std::path::{Path, PathBuf};

/// Resolved executable, script and extra arguments of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    executable: PathBuf,
    script: PathBuf,
    extra_args: Vec<String>,
}

impl SpawnSpec {
    pub(crate) fn new(executable: PathBuf, script: PathBuf, extra_args: Vec<String>) -> Self {
        Self {
            executable,
            script,
            extra_args,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// Process arguments: the script path followed by the extra arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.script.to_string_lossy().into_owned())
            .chain(self.extra_args.iter().cloned())
            .collect()
    }

    /// Space-joined command line for display. Arguments are not quoted.
    pub fn command_line(&self) -> String {
        let mut line = self.executable.to_string_lossy().into_owned();
        for arg in self.argv() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}
