//! Crawl configuration types.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

/// Configuration for one crawl endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CrawlConfig {
    /// Share (or volume) name.
    #[builder(default)]
    #[serde(default)]
    pub share: String,

    /// Directory inside the share.
    #[builder(default)]
    #[serde(default)]
    pub path: String,

    /// Descend into subdirectories.
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Files are kept only from listings at this depth or deeper.
    #[builder(default = "0")]
    #[serde(default)]
    pub min_depth: u32,

    /// Recursion continues while the current depth is below this value.
    #[builder(default = "u32::MAX")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum files queued per poll (0 = unlimited).
    #[builder(default = "0")]
    #[serde(default)]
    pub max_files_per_poll: usize,

    /// Glob patterns a file must match (empty = everything).
    #[builder(default)]
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns that exclude a file.
    #[builder(default)]
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Skip files carrying the DOS hidden flag.
    #[builder(default = "false")]
    #[serde(default)]
    pub skip_hidden: bool,

    /// Exclude a file while a sibling named `<file><suffix>` exists.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub marker_suffix: Option<String>,

    /// List symbolic links as their targets instead of skipping them.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_max_depth() -> u32 {
    u32::MAX
}

impl CrawlConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let share = self.share.as_deref().unwrap_or_default();
        let path = self.path.as_deref().unwrap_or_default();
        check_root(share, path)?;
        check_depths(
            self.min_depth.unwrap_or(0),
            self.max_depth.unwrap_or(u32::MAX),
        )
    }
}

fn check_root(share: &str, path: &str) -> Result<(), String> {
    if share.trim().is_empty() && path.trim().is_empty() {
        return Err("Share and path cannot both be empty".to_string());
    }
    Ok(())
}

/// The root listing is always taken, so any `min_depth` up to 1 can yield
/// files regardless of `max_depth`.
fn check_depths(min_depth: u32, max_depth: u32) -> Result<(), String> {
    let deepest = max_depth.max(1);
    if min_depth > deepest {
        return Err(format!(
            "min_depth ({min_depth}) cannot exceed the deepest listing ({deepest})"
        ));
    }
    Ok(())
}

impl CrawlConfig {
    /// Create a new crawl config builder.
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }

    /// Create a simple non-recursive config for a single root path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            share: String::new(),
            path: path.into(),
            recursive: false,
            min_depth: 0,
            max_depth: u32::MAX,
            max_files_per_poll: 0,
            include: Vec::new(),
            exclude: Vec::new(),
            skip_hidden: false,
            marker_suffix: None,
            follow_symlinks: false,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check the same rules the builder enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_root(&self.share, &self.path)
            .and_then(|()| check_depths(self.min_depth, self.max_depth))
            .map_err(|message| ConfigError::Invalid { message })
    }

    /// Logical root of this endpoint: share and path joined with `/`.
    pub fn endpoint_path(&self) -> String {
        let share = paths::normalize(&self.share);
        let path = paths::normalize(&self.path);
        if share.is_empty() {
            path
        } else if path.is_empty() {
            share
        } else {
            paths::normalize(&paths::join(&share, &path))
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
