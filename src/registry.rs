//! Registry of watched paths.
//!
//! The notification backend does not expose a watch-list primitive, so
//! the registry is the source of truth for what is currently monitored.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Set of registered watch targets (files and directories).
///
/// Inserts are idempotent: registering an already-present path is a
/// no-op. The set is populated before the dispatch loop starts and read
/// only after that.
#[derive(Debug, Default)]
pub struct PathRegistry {
    paths: HashSet<PathBuf>,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path. Returns `true` if it was not already registered.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    /// Check if a path is registered.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Snapshot of all registered targets. Order is not meaningful.
    pub fn list(&self) -> Vec<PathBuf> {
        self.paths.iter().cloned().collect()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True before anything has been registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
