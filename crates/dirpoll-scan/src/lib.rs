//! Directory crawling engine for dirpoll.
//!
//! This crate walks a hierarchical listing depth-first and turns it into a
//! flat collection of [`FileRecord`]s, ready to be queued by a polling
//! ingestion pipeline.
//!
//! # Overview
//!
//! The [`DirectoryScanner`] depends on three narrow collaborators:
//!
//! - **[`ListingSource`]** enumerates one directory ([`LocalListing`],
//!   [`MemoryListing`], or a remote store supplied by the host)
//! - **[`MatchPredicate`]** decides which files are queued ([`AcceptAll`],
//!   [`GlobFilter`], or any closure)
//! - **[`CapacityCheck`]** bounds how many files one poll may queue
//!   ([`Unbounded`], [`MaxFiles`], or any closure)
//!
//! # Example
//!
//! ```rust,no_run
//! use dirpoll_scan::{CrawlConfig, DirectoryScanner, LocalListing, limit_from_config};
//!
//! let config = CrawlConfig::builder()
//!     .path("/srv/inbound")
//!     .recursive(true)
//!     .max_depth(3u32)
//!     .max_files_per_poll(100usize)
//!     .build()
//!     .unwrap();
//!
//! let scanner = DirectoryScanner::from_config(LocalListing::new(), &config).unwrap();
//! let outcome = scanner.poll(&limit_from_config(&config)).unwrap();
//!
//! for record in &outcome.records {
//!     println!("{} ({} bytes)", record.file_name, record.length);
//! }
//! if outcome.truncated {
//!     println!("more files are waiting for the next poll");
//! }
//! ```

mod capacity;
mod filter;
mod local;
mod mapper;
mod memory;
mod scanner;
mod source;

pub use capacity::{CapacityCheck, MaxFiles, Unbounded};
pub use filter::{AcceptAll, GlobFilter, MatchPredicate};
pub use local::LocalListing;
pub use mapper::map_entry;
pub use memory::MemoryListing;
pub use scanner::{DirectoryScanner, ScanOptions, ScanOutcome, limit_from_config};
pub use source::ListingSource;

// Re-export core types for convenience
pub use dirpoll_core::{
    CrawlConfig, DosAttributes, FileRecord, ListingError, MappingError, RawEntry, RecordHeaders,
    ScanError, ScanStats,
};
