//! Error types for listing, mapping and scanning.

use std::path::PathBuf;

use thiserror::Error;

/// Errors a listing source reports for a directory it could not enumerate.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// Path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote store or connection failure.
    #[error("Transport error at {path}: {message}")]
    Transport { path: String, message: String },
}

impl ListingError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a transport error.
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The path that failed to list.
    pub fn path(&self) -> &str {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::NotADirectory { path }
            | Self::Io { path, .. }
            | Self::Transport { path, .. } => path,
        }
    }
}

/// A raw entry that cannot be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Entry has no name.
    #[error("Entry has an empty name")]
    EmptyName,

    /// Entry name is not a single path component.
    #[error("Invalid entry name: {name:?}")]
    InvalidName { name: String },
}

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A directory could not be listed.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// The listing source returned a malformed entry.
    #[error("Malformed entry under {parent}: {source}")]
    Mapping {
        parent: String,
        #[source]
        source: MappingError,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A filter pattern failed to compile.
    #[error("Invalid pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },
}

impl ScanError {
    /// Check if this error came from the listing source.
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::Listing(_))
    }
}

/// Errors loading a crawl configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
