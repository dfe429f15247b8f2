//! Logical path handling.
//!
//! Every path that flows through the crawler uses `/` as its only
//! separator. Listing sources translate to whatever their backing store
//! expects (a local OS path, an SMB share path, ...) at their own boundary.

/// The separator used by all logical paths.
pub const SEPARATOR: char = '/';

/// Normalize a path to the logical form.
///
/// Backslashes become `/`, runs of separators collapse to one and a
/// trailing separator is removed. A path made only of separators
/// normalizes to `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_sep = false;

    for c in path.chars() {
        let c = if c == '\\' { SEPARATOR } else { c };
        if c == SEPARATOR {
            if !last_was_sep {
                out.push(SEPARATOR);
            }
            last_was_sep = true;
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }

    if out.len() > 1 && out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

/// Join a child name onto a logical parent path with a single separator.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        return child.to_string();
    }
    if parent.ends_with(SEPARATOR) {
        format!("{parent}{child}")
    } else {
        format!("{parent}{SEPARATOR}{child}")
    }
}

/// Check whether `name` is usable as a single path component.
pub fn is_valid_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(SEPARATOR)
        && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_backslashes() {
        assert_eq!(normalize("share\\docs"), "share/docs");
        assert_eq!(normalize("share\\\\docs\\"), "share/docs");
    }

    #[test]
    fn test_normalize_keeps_root() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("\\\\"), "/");
        assert_eq!(normalize("/data//in/"), "/data/in");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("share/docs", "sub"), "share/docs/sub");
        assert_eq!(join("/", "etc"), "/etc");
        assert_eq!(join("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_is_valid_component() {
        assert!(is_valid_component("a.txt"));
        assert!(!is_valid_component(""));
        assert!(!is_valid_component(".."));
        assert!(!is_valid_component("a/b"));
        assert!(!is_valid_component("a\\b"));
    }
}
