//! Error types for the content backend port

/// Errors surfaced by [`ContentBackend`](crate::ContentBackend) operations
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No record with the requested slug
    #[error("record not found: {slug}")]
    NotFound {
        /// The slug that was looked up
        slug: String,
    },

    /// The hosted backend rejected or failed the request
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl ContentError {
    /// Shorthand for a not-found error
    #[inline]
    #[must_use]
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = ContentError::not_found("my-post");
        assert!(err.to_string().contains("my-post"));
    }
}
