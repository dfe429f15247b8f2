//! Raw listing entries and normalized file records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Key for the archive flag in the attribute map view.
pub const ATTR_ARCHIVE: &str = "archive";
/// Key for the hidden flag in the attribute map view.
pub const ATTR_HIDDEN: &str = "hidden";
/// Key for the read-only flag in the attribute map view.
pub const ATTR_READ_ONLY: &str = "read-only";
/// Key for the system flag in the attribute map view.
pub const ATTR_SYSTEM: &str = "system";

/// DOS-style attribute flags carried by a listing entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DosAttributes {
    pub archive: bool,
    pub hidden: bool,
    pub read_only: bool,
    pub system: bool,
}

impl DosAttributes {
    /// Create attributes from the four flags.
    pub fn new(archive: bool, hidden: bool, read_only: bool, system: bool) -> Self {
        Self {
            archive,
            hidden,
            read_only,
            system,
        }
    }

    /// Named flags in a fixed order.
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            (ATTR_ARCHIVE, self.archive),
            (ATTR_HIDDEN, self.hidden),
            (ATTR_READ_ONLY, self.read_only),
            (ATTR_SYSTEM, self.system),
        ]
    }

    /// Map view keyed by attribute name.
    pub fn to_map(&self) -> BTreeMap<&'static str, bool> {
        self.entries().into_iter().collect()
    }

    /// Compact `AHRS` style flag string, `-` for unset flags.
    pub fn flags(&self) -> String {
        [
            (self.archive, 'A'),
            (self.hidden, 'H'),
            (self.read_only, 'R'),
            (self.system, 'S'),
        ]
        .iter()
        .map(|&(set, c)| if set { c } else { '-' })
        .collect()
    }
}

/// One child entry as returned by a listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Entry name (single path component).
    pub name: CompactString,
    /// Full length in bytes.
    pub length: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// DOS attribute flags.
    pub attributes: DosAttributes,
}

impl RawEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<CompactString>, length: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            length,
            last_modified,
            is_directory: false,
            attributes: DosAttributes::default(),
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<CompactString>, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            length: 0,
            last_modified,
            is_directory: true,
            attributes: DosAttributes::default(),
        }
    }

    /// Replace the attribute flags.
    pub fn with_attributes(mut self, attributes: DosAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Transfer headers derived from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeaders {
    /// File length in bytes.
    pub file_length: u64,
    /// Last modification in epoch milliseconds, absent for pre-epoch times.
    pub last_modified: Option<i64>,
}

/// A normalized file record produced by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Scanned directory joined with the entry name.
    pub absolute_path: String,
    /// Entry name relative to the scanned directory.
    pub relative_path: String,
    /// Bare entry name.
    pub name: CompactString,
    /// Path relative to the scan root (prefix + name).
    pub file_name: String,
    /// Logical endpoint root this record was crawled from.
    pub endpoint_path: String,
    /// Length in bytes.
    pub length: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// DOS attribute flags.
    pub attributes: DosAttributes,
    /// Depth of the listing that produced this record (root children = 1).
    pub depth: u32,
}

impl FileRecord {
    /// Attribute flags keyed by name.
    pub fn extended_attributes(&self) -> BTreeMap<&'static str, bool> {
        self.attributes.to_map()
    }

    /// Headers a downstream consumer attaches to the transferred file.
    pub fn headers(&self) -> RecordHeaders {
        let millis = self.last_modified.timestamp_millis();
        RecordHeaders {
            file_length: self.length,
            last_modified: (millis >= 0).then_some(millis),
        }
    }
}
