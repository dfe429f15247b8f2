//! Counters collected during one traversal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary statistics for a single scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of directories listed.
    pub dirs_listed: u64,
    /// Number of entries visited across all listings.
    pub entries_seen: u64,
    /// Number of files placed in the output.
    pub files_accepted: u64,
    /// Files visited above the minimum depth.
    pub skipped_by_depth: u64,
    /// Files rejected by the match predicate.
    pub rejected_by_filter: u64,
    /// Deepest listing performed.
    pub max_depth_reached: u32,
    /// Listing calls keyed by the depth of the listed entries.
    pub listings_by_depth: BTreeMap<u32, u64>,
}

impl ScanStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a listing call whose children sit at `depth`.
    pub fn record_listing(&mut self, depth: u32, entries: usize) {
        self.dirs_listed += 1;
        self.entries_seen += entries as u64;
        self.max_depth_reached = self.max_depth_reached.max(depth);
        *self.listings_by_depth.entry(depth).or_default() += 1;
    }

    /// Record a file placed in the output.
    pub fn record_accepted(&mut self) {
        self.files_accepted += 1;
    }

    /// Record a file skipped because it sits above the minimum depth.
    pub fn record_depth_skip(&mut self) {
        self.skipped_by_depth += 1;
    }

    /// Record a file rejected by the match predicate.
    pub fn record_rejected(&mut self) {
        self.rejected_by_filter += 1;
    }

    /// Number of listing calls made at `depth`.
    pub fn listings_at(&self, depth: u32) -> u64 {
        self.listings_by_depth.get(&depth).copied().unwrap_or(0)
    }
}
