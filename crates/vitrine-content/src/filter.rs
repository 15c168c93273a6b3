//! Listing filter
//!
//! The table API selects rows by status, category, and slug; listings come
//! back ordered by the timestamp column, newest first. The filter carries
//! the selection; ordering is the backend's side of the contract.

use crate::records::{ContentRecord, RecordStatus};

/// Row selection for listing queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Match only records with this status
    pub status: Option<RecordStatus>,
    /// Match only records in this category
    pub category: Option<String>,
    /// Match only the record with this slug
    pub slug: Option<String>,
}

impl RecordFilter {
    /// Match everything
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match only published records
    #[inline]
    #[must_use]
    pub fn published() -> Self {
        Self {
            status: Some(RecordStatus::Published),
            ..Self::default()
        }
    }

    /// Restrict to a category
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a slug
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Whether a record passes the filter
    #[must_use]
    pub fn matches<R: ContentRecord>(&self, record: &R) -> bool {
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if record.category() != category {
                return false;
            }
        }
        if let Some(slug) = &self.slug {
            if record.slug() != slug {
                return false;
            }
        }
        true
    }
}
