use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{Handle, Result, StateError};

/// Represents the session environment: the working directory and the variables passed to children
/// * The shell never writes these back into its own process, so several sessions can coexist
/// * in one process (the test suite relies on this)
#[derive(Debug, Clone)]
pub struct Environment {
    cwd: PathBuf,
    variables: BTreeMap<String, String>,
}

impl Environment {
    /// Captures the working directory and variables the shell was started with
    pub fn capture() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(StateError::UnknownWorkingDirectory)?;
        Ok(Self::new(cwd, std::env::vars()))
    }

    pub fn new(cwd: PathBuf, variables: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            cwd,
            variables: variables.into_iter().collect(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Changes the working directory, resolving relative paths against the current one
    pub fn set_cwd(&mut self, new_directory: &str) -> Result<()> {
        let target = self.resolve(new_directory);
        let absolute_path = fs_err::canonicalize(&target)?;
        if !absolute_path.is_dir() {
            return Err(StateError::NotADirectory(target).into());
        }

        self.cwd = absolute_path;
        Ok(())
    }

    /// Makes a user-supplied path absolute relative to the working directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(path)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_owned(), value.to_owned());
    }

    /// Parses a `KEY=VALUE` assignment and stores it
    pub fn assign(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .replace_err(|| StateError::MalformedAssignment(assignment.to_owned()))?;

        self.set(key, value);
        Ok(())
    }

    /// Iterates over the variables in key order
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
