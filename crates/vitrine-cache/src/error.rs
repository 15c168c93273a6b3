//! Error types for cache operations

/// Errors raised by [`TtlCache`](crate::TtlCache) operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The value could not be serialized or deserialized
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
