//! Listing source backed by the local file system.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, PathBuf};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};

use dirpoll_core::{DosAttributes, ListingError, RawEntry, paths};

use crate::source::ListingSource;

/// Lists local directories one level at a time using jwalk.
///
/// Entries come back sorted by name. Symbolic links are skipped unless
/// link following is enabled. Entries whose metadata cannot be read, and
/// entries whose names cannot be carried as a logical path component (not
/// UTF-8, or containing a separator), are skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalListing {
    follow_symlinks: bool,
}

impl LocalListing {
    /// Create a new local listing source.
    pub fn new() -> Self {
        Self::default()
    }

    /// List symbolic links as their targets instead of skipping them.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Whether symbolic links are followed.
    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }
}

impl ListingSource for LocalListing {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>, ListingError> {
        let os_path = to_os_path(path);

        let metadata = std::fs::metadata(&os_path).map_err(|e| ListingError::io(path, e))?;
        if !metadata.is_dir() {
            return Err(ListingError::NotADirectory {
                path: path.to_string(),
            });
        }

        let walker = WalkDir::new(&os_path)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(self.follow_symlinks)
            .sort(true)
            .min_depth(1)
            .max_depth(1);

        let mut entries = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                // Depth 0 means the directory itself could not be read.
                Err(err) if err.depth() == 0 => return Err(walk_error(path, err)),
                Err(err) => {
                    tracing::warn!(path, error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !self.follow_symlinks && entry.file_type().is_symlink() {
                tracing::trace!(path = %entry.path().display(), "skipping symbolic link");
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!(path = %entry.path().display(), "skipping entry with non-UTF-8 name");
                continue;
            };
            if !paths::is_valid_component(name) {
                tracing::warn!(path, name, "skipping entry with unsupported name");
                continue;
            }
            let name = name.to_string();

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), error = %err, "skipping entry without metadata");
                    continue;
                }
            };

            entries.push(RawEntry {
                attributes: dos_attributes(&name, &metadata),
                name: CompactString::from(name),
                length: if metadata.is_dir() { 0 } else { metadata.len() },
                last_modified: metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH)),
                is_directory: metadata.is_dir(),
            });
        }

        Ok(entries)
    }
}

/// Translate a logical path to the platform separator.
fn to_os_path(path: &str) -> PathBuf {
    if MAIN_SEPARATOR == '/' {
        PathBuf::from(path)
    } else {
        PathBuf::from(path.replace('/', MAIN_SEPARATOR_STR))
    }
}

fn walk_error(path: &str, err: jwalk::Error) -> ListingError {
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    ListingError::io(path, source)
}

// Cross-platform attribute helpers

#[cfg(windows)]
fn dos_attributes(_name: &str, metadata: &std::fs::Metadata) -> DosAttributes {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_READONLY: u32 = 0x1;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;

    let attrs = metadata.file_attributes();
    DosAttributes::new(
        attrs & FILE_ATTRIBUTE_ARCHIVE != 0,
        attrs & FILE_ATTRIBUTE_HIDDEN != 0,
        attrs & FILE_ATTRIBUTE_READONLY != 0,
        attrs & FILE_ATTRIBUTE_SYSTEM != 0,
    )
}

/// Dot files count as hidden; archive and system have no equivalent.
#[cfg(not(windows))]
fn dos_attributes(name: &str, metadata: &std::fs::Metadata) -> DosAttributes {
    DosAttributes::new(
        false,
        name.starts_with('.'),
        metadata.permissions().readonly(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn logical(temp: &TempDir) -> String {
        dirpoll_core::paths::normalize(&temp.path().to_string_lossy())
    }

    #[test]
    fn test_list_sorted_children() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "bb").unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/nested.txt"), "nested").unwrap();

        let entries = LocalListing::new().list(&logical(&temp)).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(entries[1].length, 2);
        assert!(!entries[1].is_directory);
        assert!(entries[2].is_directory);
    }

    #[test]
    fn test_list_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = format!("{}/missing", logical(&temp));

        let err = LocalListing::new().list(&missing).unwrap_err();
        assert!(matches!(err, ListingError::NotFound { .. }));
        assert_eq!(err.path(), missing);
    }

    #[test]
    fn test_list_file_is_not_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("plain.txt"), "x").unwrap();
        let file = format!("{}/plain.txt", logical(&temp));

        let err = LocalListing::new().list(&file).unwrap_err();
        assert!(matches!(err, ListingError::NotADirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dot_files_are_hidden() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "x").unwrap();

        let entries = LocalListing::new().list(&logical(&temp)).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].attributes.hidden);
        assert!(!entries[0].attributes.archive);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(OsStr::from_bytes(b"d\xff"))).unwrap();
        fs::write(temp.path().join("ok.txt"), "x").unwrap();

        let entries = LocalListing::new().list(&logical(&temp)).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ok.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_name_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a\\b.txt"), "x").unwrap();
        fs::write(temp.path().join("c.txt"), "x").unwrap();

        let entries = LocalListing::new().list(&logical(&temp)).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_unless_followed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.txt"), "abc").unwrap();
        std::os::unix::fs::symlink(temp.path().join("target.txt"), temp.path().join("link.txt"))
            .unwrap();

        let entries = LocalListing::new().list(&logical(&temp)).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["target.txt"]);

        let listing = LocalListing::new().with_follow_symlinks(true);
        assert!(listing.follow_symlinks());
        let entries = listing.list(&logical(&temp)).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["link.txt", "target.txt"]);
        assert_eq!(entries[0].length, 3);
        assert!(!entries[0].is_directory);
    }
}
