use thiserror::Error;

/// Error returned when constructing a cache with a capacity of zero.
///
/// The capacity is fixed at construction and every cache must be able to
/// hold at least one entry, so a zero capacity is rejected up front rather
/// than producing a cache that evicts everything it is given.
///
/// # Example
///
/// ```
/// use recency::{InvalidCapacity, LruCache};
///
/// let err = LruCache::<u32, u32>::new(0).unwrap_err();
/// assert_eq!(err, InvalidCapacity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("capacity must be a positive number of entries")]
pub struct InvalidCapacity;

/// Error returned when the self check finds the cache's internal structures
/// out of lockstep.
///
/// Produced only by [`LruCache::check_invariants`](crate::LruCache::check_invariants);
/// the public operations never create one. Carries a description of which
/// invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        InvariantError(msg.into())
    }

    /// Returns the error description.
    pub fn message(&self) -> &str {
        &self.0
    }
}
