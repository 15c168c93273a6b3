//! Error types for the media layer

use vitrine_store::StoreError;

/// Errors raised when saving an image
///
/// Missing keys on read are not errors; lookups return `None` and the
/// fallback resolver takes over. Callers treat a save failure as "no image
/// provided".
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// A storage write failed (typically quota)
    #[error("image could not be stored: {0}")]
    Store(#[from] StoreError),

    /// The image file could not be read
    #[error("image file could not be read: {0}")]
    Io(#[from] std::io::Error),
}
