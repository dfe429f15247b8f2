//! Listing sources: the capability the scanner consumes to enumerate a directory.

use dirpoll_core::{ListingError, RawEntry};

/// Enumerates the immediate children of a directory.
///
/// Paths are logical `/`-separated paths; implementations translate them
/// to whatever their backing store expects. Ordering of the returned
/// entries is preserved by the scanner.
pub trait ListingSource {
    /// List the children of `path`.
    fn list(&self, path: &str) -> Result<Vec<RawEntry>, ListingError>;
}

impl<T: ListingSource + ?Sized> ListingSource for &T {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>, ListingError> {
        (**self).list(path)
    }
}

impl<T: ListingSource + ?Sized> ListingSource for Box<T> {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>, ListingError> {
        (**self).list(path)
    }
}
