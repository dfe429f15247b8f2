//! Capacity checks bounding how many records one traversal may queue.

/// Decides whether another record may be accepted.
///
/// The scanner owns no counter; it passes the size of the output
/// collection it is filling.
pub trait CapacityCheck {
    /// Return `true` if a record may be added to a collection of `current_count`.
    fn can_accept_more(&self, current_count: usize) -> bool;
}

/// No limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl CapacityCheck for Unbounded {
    fn can_accept_more(&self, _current_count: usize) -> bool {
        true
    }
}

/// Limit to a maximum number of files per poll (0 = unlimited).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxFiles(pub usize);

impl MaxFiles {
    /// Check if this limit is effectively disabled.
    pub fn is_unbounded(&self) -> bool {
        self.0 == 0
    }
}

impl CapacityCheck for MaxFiles {
    fn can_accept_more(&self, current_count: usize) -> bool {
        self.is_unbounded() || current_count < self.0
    }
}

impl<F> CapacityCheck for F
where
    F: Fn(usize) -> bool,
{
    fn can_accept_more(&self, current_count: usize) -> bool {
        self(current_count)
    }
}
