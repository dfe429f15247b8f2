//! Match predicates deciding which files are queued.

use globset::{Glob, GlobSet, GlobSetBuilder};

use dirpoll_core::{CrawlConfig, FileRecord, RawEntry, ScanError};

/// Validity filter applied to every candidate file.
///
/// `siblings` is the full listing the record came from, so a predicate can
/// look at companion entries.
pub trait MatchPredicate {
    /// Return `true` if `record` should be placed in the output.
    fn is_acceptable(&self, record: &FileRecord, is_directory_context: bool, siblings: &[RawEntry]) -> bool;
}

/// Accepts every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MatchPredicate for AcceptAll {
    fn is_acceptable(&self, _record: &FileRecord, _is_directory_context: bool, _siblings: &[RawEntry]) -> bool {
        true
    }
}

impl<F> MatchPredicate for F
where
    F: Fn(&FileRecord, bool, &[RawEntry]) -> bool,
{
    fn is_acceptable(&self, record: &FileRecord, is_directory_context: bool, siblings: &[RawEntry]) -> bool {
        self(record, is_directory_context, siblings)
    }
}

/// Glob-based include/exclude filter.
///
/// Patterns are matched against both the bare name and the path relative
/// to the scan root.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    skip_hidden: bool,
    marker_suffix: Option<String>,
}

impl GlobFilter {
    /// Create an empty filter that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from the filtering fields of a crawl config.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ScanError> {
        let mut filter = Self::new()
            .with_include(&config.include)?
            .with_exclude(&config.exclude)?
            .with_skip_hidden(config.skip_hidden);
        if let Some(suffix) = &config.marker_suffix {
            filter = filter.with_marker_suffix(suffix.clone());
        }
        Ok(filter)
    }

    /// Only accept files matching one of `patterns` (no-op when empty).
    pub fn with_include(mut self, patterns: &[String]) -> Result<Self, ScanError> {
        self.include = build_globset(patterns)?;
        Ok(self)
    }

    /// Reject files matching any of `patterns`.
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self, ScanError> {
        self.exclude = build_globset(patterns)?;
        Ok(self)
    }

    /// Reject files carrying the DOS hidden flag.
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Reject a file while a sibling named `<file><suffix>` is present.
    pub fn with_marker_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix: String = suffix.into();
        self.marker_suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    fn matches(set: &GlobSet, record: &FileRecord) -> bool {
        set.is_match(record.name.as_str()) || set.is_match(&record.file_name)
    }

    fn has_marker(&self, record: &FileRecord, siblings: &[RawEntry]) -> bool {
        let Some(suffix) = &self.marker_suffix else {
            return false;
        };
        let marker = format!("{}{suffix}", record.name);
        siblings
            .iter()
            .any(|entry| !entry.is_directory && entry.name.as_str() == marker)
    }
}

impl MatchPredicate for GlobFilter {
    fn is_acceptable(&self, record: &FileRecord, is_directory_context: bool, siblings: &[RawEntry]) -> bool {
        if is_directory_context {
            return true;
        }
        if self.skip_hidden && record.attributes.hidden {
            return false;
        }
        if let Some(include) = &self.include {
            if !Self::matches(include, record) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if Self::matches(exclude, record) {
                return false;
            }
        }
        !self.has_marker(record, siblings)
    }
}

/// Compile patterns into a set, `None` when there are no patterns.
fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ScanError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map(Some).map_err(|e| ScanError::Pattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}
