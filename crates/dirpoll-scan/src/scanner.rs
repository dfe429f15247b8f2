//! Depth-first directory scanner.

use std::time::{Duration, Instant};

use serde::Serialize;

use dirpoll_core::{CrawlConfig, FileRecord, ScanError, ScanStats, paths};

use crate::capacity::{CapacityCheck, MaxFiles};
use crate::filter::{AcceptAll, GlobFilter, MatchPredicate};
use crate::mapper::map_entry;
use crate::source::ListingSource;

/// Traversal bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Files are kept once the current depth reaches this value.
    pub min_depth: u32,
    /// Recursion continues while the current depth is below this value.
    pub max_depth: u32,
}

impl ScanOptions {
    /// Take the traversal bounds from a crawl config.
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            recursive: config.recursive,
            min_depth: config.min_depth,
            max_depth: config.max_depth,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            min_depth: 0,
            max_depth: u32::MAX,
        }
    }
}

/// Result of one top-level scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Accepted file records in traversal order.
    pub records: Vec<FileRecord>,
    /// Whether the capacity limit cut the traversal short.
    pub truncated: bool,
    /// Traversal counters.
    pub stats: ScanStats,
    /// Wall time spent scanning.
    pub elapsed: Duration,
}

impl ScanOutcome {
    /// Total bytes across all records.
    pub fn total_length(&self) -> u64 {
        self.records.iter().map(|r| r.length).sum()
    }
}

/// Recursive, depth-bounded scanner over a [`ListingSource`].
///
/// The scanner is synchronous and single-threaded: each directory is listed
/// once, children are processed in listing order, and subdirectories are
/// visited depth-first as they are encountered.
pub struct DirectoryScanner<L, M = AcceptAll> {
    source: L,
    matcher: M,
    endpoint_path: String,
    options: ScanOptions,
}

impl<L: ListingSource> DirectoryScanner<L, AcceptAll> {
    /// Create a non-recursive scanner that accepts every file.
    pub fn new(source: L, endpoint_path: impl Into<String>) -> Self {
        Self {
            source,
            matcher: AcceptAll,
            endpoint_path: paths::normalize(&endpoint_path.into()),
            options: ScanOptions::default(),
        }
    }
}

impl<L: ListingSource> DirectoryScanner<L, GlobFilter> {
    /// Create a scanner with bounds and filters taken from a crawl config.
    pub fn from_config(source: L, config: &CrawlConfig) -> Result<Self, ScanError> {
        config.validate().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;

        Ok(Self {
            source,
            matcher: GlobFilter::from_config(config)?,
            endpoint_path: config.endpoint_path(),
            options: ScanOptions::from_config(config),
        })
    }
}

impl<L: ListingSource, M: MatchPredicate> DirectoryScanner<L, M> {
    /// Replace the match predicate.
    pub fn with_matcher<N: MatchPredicate>(self, matcher: N) -> DirectoryScanner<L, N> {
        DirectoryScanner {
            source: self.source,
            matcher,
            endpoint_path: self.endpoint_path,
            options: self.options,
        }
    }

    /// Replace the traversal bounds.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Traversal bounds in effect.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Logical endpoint root stamped on every record.
    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }

    /// The listing source.
    pub fn source(&self) -> &L {
        &self.source
    }

    /// Scan the endpoint root with the given limit.
    pub fn poll<C: CapacityCheck + ?Sized>(&self, limit: &C) -> Result<ScanOutcome, ScanError> {
        self.scan(&self.endpoint_path, 0, limit)
    }

    /// Scan `path`, whose own depth is `depth` (0 for the scan root).
    pub fn scan<C: CapacityCheck + ?Sized>(
        &self,
        path: &str,
        depth: u32,
        limit: &C,
    ) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let mut records = Vec::new();
        let mut stats = ScanStats::new();

        let truncated = self.scan_with_stats(path, depth, limit, &mut records, &mut stats)?;
        let elapsed = start.elapsed();

        tracing::debug!(
            path,
            records = records.len(),
            dirs_listed = stats.dirs_listed,
            truncated,
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            records,
            truncated,
            stats,
            elapsed,
        })
    }

    /// Scan `path` appending accepted records to a caller-owned collection.
    ///
    /// Returns `Ok(true)` if the capacity limit cut the traversal short. On
    /// error, records appended before the failure stay in `records`.
    pub fn scan_into<C: CapacityCheck + ?Sized>(
        &self,
        path: &str,
        depth: u32,
        limit: &C,
        records: &mut Vec<FileRecord>,
    ) -> Result<bool, ScanError> {
        let mut stats = ScanStats::new();
        self.scan_with_stats(path, depth, limit, records, &mut stats)
    }

    /// Like [`scan_into`](Self::scan_into), also accumulating counters.
    pub fn scan_with_stats<C: CapacityCheck + ?Sized>(
        &self,
        path: &str,
        depth: u32,
        limit: &C,
        records: &mut Vec<FileRecord>,
        stats: &mut ScanStats,
    ) -> Result<bool, ScanError> {
        let root = paths::normalize(path);
        if root.is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "Scan path cannot be empty".to_string(),
            });
        }
        self.poll_directory(&root, "", depth, limit, records, stats)
    }

    /// List one directory and process its children.
    ///
    /// `prefix` is the path from the scan root to `path`, ending in `/`
    /// below the root. Returns `Ok(true)` when the limit was reached.
    fn poll_directory<C: CapacityCheck + ?Sized>(
        &self,
        path: &str,
        prefix: &str,
        depth: u32,
        limit: &C,
        records: &mut Vec<FileRecord>,
        stats: &mut ScanStats,
    ) -> Result<bool, ScanError> {
        let current_depth = depth.saturating_add(1);
        tracing::trace!(path, depth = current_depth, "listing directory");

        let entries = self.source.list(path)?;
        stats.record_listing(current_depth, entries.len());

        for entry in &entries {
            let record = map_entry(path, entry, &self.endpoint_path, prefix, current_depth)
                .map_err(|source| ScanError::Mapping {
                    parent: path.to_string(),
                    source,
                })?;

            // Only directories that will be entered and files deep enough
            // to be queued count as candidates for the capacity check.
            let candidate = if record.is_directory {
                self.options.recursive && current_depth < self.options.max_depth
            } else if current_depth < self.options.min_depth {
                stats.record_depth_skip();
                false
            } else {
                true
            };
            if !candidate {
                continue;
            }

            if !limit.can_accept_more(records.len()) {
                tracing::debug!(path, count = records.len(), "capacity limit reached");
                return Ok(true);
            }

            if record.is_directory {
                let sub_path = paths::join(path, &record.relative_path);
                let sub_prefix = format!("{prefix}{}/", record.relative_path);
                if self.poll_directory(&sub_path, &sub_prefix, current_depth, limit, records, stats)? {
                    return Ok(true);
                }
            } else if self.matcher.is_acceptable(&record, false, &entries) {
                records.push(record);
                stats.record_accepted();
            } else {
                stats.record_rejected();
            }
        }

        Ok(false)
    }
}

/// Capacity check for a crawl config's per-poll file limit.
pub fn limit_from_config(config: &CrawlConfig) -> MaxFiles {
    MaxFiles(config.max_files_per_poll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dirpoll_core::{ListingError, RawEntry};

    use crate::capacity::Unbounded;
    use crate::memory::MemoryListing;

    fn t(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
    }

    /// root/{x.txt, d1/{y.txt, d2/{z.txt}}}
    fn three_level_tree() -> MemoryListing {
        MemoryListing::new()
            .with_dir("root", vec![RawEntry::file("x.txt", 1, t(1)), RawEntry::directory("d1", t(1))])
            .with_dir("root/d1", vec![RawEntry::file("y.txt", 2, t(2)), RawEntry::directory("d2", t(2))])
            .with_dir("root/d1/d2", vec![RawEntry::file("z.txt", 3, t(3))])
    }

    fn names(outcome: &ScanOutcome) -> Vec<&str> {
        outcome.records.iter().map(|r| r.file_name.as_str()).collect()
    }

    fn recursive(min_depth: u32, max_depth: u32) -> ScanOptions {
        ScanOptions {
            recursive: true,
            min_depth,
            max_depth,
        }
    }

    #[test]
    fn test_non_recursive_lists_root_only() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root");

        let outcome = scanner.poll(&Unbounded).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt"]);
        assert!(!outcome.truncated);
        assert_eq!(listing.calls("root/d1"), 0);
        assert_eq!(outcome.stats.dirs_listed, 1);
    }

    #[test]
    fn test_recursive_unbounded() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, u32::MAX));

        let outcome = scanner.poll(&Unbounded).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/y.txt", "d1/d2/z.txt"]);
        let depths: Vec<u32> = outcome.records.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(outcome.records[2].absolute_path, "root/d1/d2/z.txt");
        assert_eq!(outcome.total_length(), 6);
    }

    #[test]
    fn test_max_depth_bounds_recursion() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, 2));

        let outcome = scanner.poll(&Unbounded).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/y.txt"]);
        assert_eq!(listing.calls("root/d1/d2"), 0);
        assert_eq!(outcome.stats.listings_at(3), 0);
    }

    #[test]
    fn test_max_depth_zero_disables_recursion() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, 0));

        let outcome = scanner.poll(&Unbounded).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt"]);
        assert_eq!(listing.total_calls(), 1);
    }

    #[test]
    fn test_min_depth_skips_shallow_files() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(2, u32::MAX));

        let outcome = scanner.poll(&Unbounded).unwrap();

        assert_eq!(names(&outcome), vec!["d1/y.txt", "d1/d2/z.txt"]);
        assert_eq!(outcome.stats.skipped_by_depth, 1);
    }

    #[test]
    fn test_nested_truncation_stops_parent() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, u32::MAX));

        let outcome = scanner.poll(&MaxFiles(2)).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/y.txt"]);
        assert!(outcome.truncated);
        assert_eq!(listing.calls("root/d1/d2"), 0);
    }

    #[test]
    fn test_unvisited_directory_does_not_truncate() {
        let listing = MemoryListing::new()
            .with_dir("root", vec![RawEntry::file("a.txt", 1, t(1)), RawEntry::directory("sub", t(1))])
            .with_dir("root/sub", vec![RawEntry::file("b.txt", 1, t(1))]);
        let scanner = DirectoryScanner::new(&listing, "root");

        let outcome = scanner.poll(&MaxFiles(1)).unwrap();

        assert_eq!(names(&outcome), vec!["a.txt"]);
        assert!(!outcome.truncated);
        assert_eq!(listing.calls("root/sub"), 0);
    }

    #[test]
    fn test_directory_beyond_max_depth_does_not_truncate() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, 2));

        let outcome = scanner.poll(&MaxFiles(2)).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/y.txt"]);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_shallow_files_do_not_truncate() {
        let listing = MemoryListing::new()
            .with_dir("root", vec![RawEntry::directory("d", t(1)), RawEntry::file("top.txt", 1, t(1))])
            .with_dir("root/d", vec![RawEntry::file("deep.txt", 1, t(1))]);
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(2, u32::MAX));

        let outcome = scanner.poll(&MaxFiles(1)).unwrap();

        assert_eq!(names(&outcome), vec!["d/deep.txt"]);
        assert!(!outcome.truncated);
        assert_eq!(outcome.stats.skipped_by_depth, 1);
    }

    #[test]
    fn test_closure_limit_and_matcher() {
        let listing = three_level_tree();
        let scanner = DirectoryScanner::new(&listing, "root")
            .with_options(recursive(0, u32::MAX))
            .with_matcher(|record: &FileRecord, _dir: bool, _siblings: &[RawEntry]| record.length != 2);

        let outcome = scanner.poll(&|count: usize| count < 10).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/d2/z.txt"]);
        assert_eq!(outcome.stats.rejected_by_filter, 1);
    }

    #[test]
    fn test_matcher_sees_siblings() {
        let listing = MemoryListing::new().with_dir(
            "in",
            vec![
                RawEntry::file("a.csv", 1, t(1)),
                RawEntry::file("a.csv.lock", 0, t(1)),
                RawEntry::file("b.csv", 1, t(1)),
            ],
        );
        let scanner = DirectoryScanner::new(&listing, "in").with_matcher(
            GlobFilter::new()
                .with_marker_suffix(".lock")
                .with_exclude(&["*.lock".to_string()])
                .unwrap(),
        );

        let outcome = scanner.poll(&Unbounded).unwrap();
        assert_eq!(names(&outcome), vec!["b.csv"]);
    }

    #[test]
    fn test_listing_error_keeps_partial_records() {
        let listing = MemoryListing::new()
            .with_dir(
                "root",
                vec![
                    RawEntry::directory("ok", t(1)),
                    RawEntry::directory("bad", t(1)),
                    RawEntry::file("late.txt", 1, t(1)),
                ],
            )
            .with_dir("root/ok", vec![RawEntry::file("early.txt", 1, t(1))])
            .with_failure("root/bad", "connection reset");
        let scanner = DirectoryScanner::new(&listing, "root").with_options(recursive(0, u32::MAX));

        let mut records = Vec::new();
        let err = scanner.scan_into("root", 0, &Unbounded, &mut records).unwrap_err();

        assert!(matches!(err, ScanError::Listing(ListingError::Transport { .. })));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "ok/early.txt");
        assert!(scanner.scan("root", 0, &Unbounded).is_err());
    }

    #[test]
    fn test_mapping_error_surfaces() {
        let listing = MemoryListing::new().with_dir("root", vec![RawEntry::file("", 1, t(1))]);
        let scanner = DirectoryScanner::new(&listing, "root");

        let err = scanner.poll(&Unbounded).unwrap_err();
        assert!(matches!(err, ScanError::Mapping { .. }));
    }

    #[test]
    fn test_empty_path_rejected() {
        let listing = MemoryListing::new();
        let scanner = DirectoryScanner::new(&listing, "root");

        let err = scanner.scan("", 0, &Unbounded).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig { .. }));
        assert_eq!(listing.total_calls(), 0);
    }

    #[test]
    fn test_from_config() {
        let listing = three_level_tree();
        let config = CrawlConfig::builder()
            .path("root")
            .recursive(true)
            .exclude(vec!["y.*".to_string()])
            .max_files_per_poll(5usize)
            .build()
            .unwrap();
        let scanner = DirectoryScanner::from_config(&listing, &config).unwrap();

        let outcome = scanner.poll(&limit_from_config(&config)).unwrap();

        assert_eq!(names(&outcome), vec!["x.txt", "d1/d2/z.txt"]);
        assert!(outcome.records.iter().all(|r| r.endpoint_path == "root"));
    }
}
