//! Error types for storage operations

/// Errors raised by key-value store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write would exceed the store's capacity
    #[error("storage quota exceeded: write of {requested} bytes over {limit} byte limit")]
    QuotaExceeded {
        /// Total usage the write would have produced
        requested: usize,
        /// Configured capacity
        limit: usize,
    },
}

impl StoreError {
    /// Check whether this error is a capacity failure
    #[inline]
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
