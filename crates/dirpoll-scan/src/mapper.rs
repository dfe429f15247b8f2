//! Conversion of raw listing entries into file records.

use dirpoll_core::{FileRecord, MappingError, RawEntry, paths};

/// Map one raw entry listed under `parent_path` into a [`FileRecord`].
///
/// `relative_prefix` is the path from the scan root to `parent_path`
/// (empty at the root, otherwise ending in `/`). `depth` is the depth of
/// the listing the entry came from.
pub fn map_entry(
    parent_path: &str,
    entry: &RawEntry,
    endpoint_path: &str,
    relative_prefix: &str,
    depth: u32,
) -> Result<FileRecord, MappingError> {
    let name = entry.name.as_str();
    if name.is_empty() {
        return Err(MappingError::EmptyName);
    }
    if !paths::is_valid_component(name) {
        return Err(MappingError::InvalidName {
            name: name.to_string(),
        });
    }

    Ok(FileRecord {
        absolute_path: paths::join(parent_path, name),
        relative_path: name.to_string(),
        name: entry.name.clone(),
        file_name: format!("{relative_prefix}{name}"),
        endpoint_path: endpoint_path.to_string(),
        length: entry.length,
        last_modified: entry.last_modified,
        is_directory: entry.is_directory,
        attributes: entry.attributes,
        depth,
    })
}
