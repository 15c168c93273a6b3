//! Hosted-backend collaborator port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ContentError;
use crate::filter::RecordFilter;
use crate::records::{BlogPost, ContentRecord, PortfolioItem};

/// A non-null `featured_image` field with the context needed to pick a
/// placeholder for it
///
/// The repair scan reads all of these in one pass rather than re-fetching
/// full records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImageRef {
    /// The raw field value (external URL or generated image key)
    pub image: String,
    /// Title of the owning record
    pub title: String,
    /// Category of the owning record
    pub category: String,
}

impl FeaturedImageRef {
    /// Build a ref from any record carrying a featured image
    #[must_use]
    pub fn from_record<R: ContentRecord>(record: &R) -> Option<Self> {
        record.featured_image().map(|image| Self {
            image: image.to_string(),
            title: record.title().to_string(),
            category: record.category().to_string(),
        })
    }
}

/// Async port for the hosted table API
///
/// Listings are ordered by the timestamp column, newest first. All calls are
/// single-awaited request/response steps with no cancellation or timeout of
/// their own; a hung backend call blocks that operation from the caller's
/// perspective.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// List blog posts matching the filter, newest first
    async fn list_posts(&self, filter: &RecordFilter) -> Result<Vec<BlogPost>, ContentError>;

    /// Fetch one blog post by slug
    async fn get_post(&self, slug: &str) -> Result<BlogPost, ContentError>;

    /// Insert a blog post row
    async fn insert_post(&self, post: BlogPost) -> Result<(), ContentError>;

    /// Update a blog post row by id
    async fn update_post(&self, post: BlogPost) -> Result<(), ContentError>;

    /// Delete a blog post row by id
    async fn delete_post(&self, id: Uuid) -> Result<(), ContentError>;

    /// List portfolio items matching the filter, newest first
    async fn list_portfolio(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<PortfolioItem>, ContentError>;

    /// Fetch one portfolio item by slug
    async fn get_portfolio(&self, slug: &str) -> Result<PortfolioItem, ContentError>;

    /// Insert a portfolio row
    async fn insert_portfolio(&self, item: PortfolioItem) -> Result<(), ContentError>;

    /// Update a portfolio row by id
    async fn update_portfolio(&self, item: PortfolioItem) -> Result<(), ContentError>;

    /// Delete a portfolio row by id
    async fn delete_portfolio(&self, id: Uuid) -> Result<(), ContentError>;

    /// All non-null `featured_image` fields across both tables
    ///
    /// Used by the media repair and prune scans.
    async fn featured_image_refs(&self) -> Result<Vec<FeaturedImageRef>, ContentError>;
}
