//! In-memory listing source.

use std::collections::HashMap;

use dashmap::DashMap;

use dirpoll_core::{ListingError, RawEntry, paths};

use crate::source::ListingSource;

/// A fixed directory tree held in memory.
///
/// Useful for hosts that already have a listing snapshot, and for tests
/// that need to count how often each directory is listed.
#[derive(Debug, Default)]
pub struct MemoryListing {
    dirs: HashMap<String, Vec<RawEntry>>,
    failures: HashMap<String, String>,
    calls: DashMap<String, u64>,
}

impl MemoryListing {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the listing for a directory.
    pub fn with_dir(mut self, path: &str, entries: Vec<RawEntry>) -> Self {
        self.insert_dir(path, entries);
        self
    }

    /// Make listing `path` fail with a transport error.
    pub fn with_failure(mut self, path: &str, message: impl Into<String>) -> Self {
        self.failures.insert(paths::normalize(path), message.into());
        self
    }

    /// Add (or replace) the listing for a directory.
    pub fn insert_dir(&mut self, path: &str, entries: Vec<RawEntry>) {
        self.dirs.insert(paths::normalize(path), entries);
    }

    /// Number of times `path` has been listed.
    pub fn calls(&self, path: &str) -> u64 {
        self.calls
            .get(&paths::normalize(path))
            .map(|c| *c)
            .unwrap_or(0)
    }

    /// Total number of listing calls.
    pub fn total_calls(&self) -> u64 {
        self.calls.iter().map(|c| *c.value()).sum()
    }

    /// Forget all recorded calls.
    pub fn reset_calls(&self) {
        self.calls.clear();
    }
}

impl ListingSource for MemoryListing {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>, ListingError> {
        let key = paths::normalize(path);
        *self.calls.entry(key.clone()).or_insert(0) += 1;

        if let Some(message) = self.failures.get(&key) {
            return Err(ListingError::transport(path, message.clone()));
        }

        self.dirs
            .get(&key)
            .cloned()
            .ok_or_else(|| ListingError::NotFound {
                path: path.to_string(),
            })
    }
}
