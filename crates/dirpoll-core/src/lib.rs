//! Core types for dirpoll.
//!
//! This crate provides the data model shared by the crawler and its
//! collaborators: raw listing entries, normalized file records, crawl
//! configuration, scan statistics and the error taxonomy.

mod config;
mod error;
pub mod paths;
mod record;
mod stats;

pub use config::{CrawlConfig, CrawlConfigBuilder};
pub use error::{ConfigError, ListingError, MappingError, ScanError};
pub use record::{
    ATTR_ARCHIVE, ATTR_HIDDEN, ATTR_READ_ONLY, ATTR_SYSTEM, DosAttributes, FileRecord, RawEntry,
    RecordHeaders,
};
pub use stats::ScanStats;
