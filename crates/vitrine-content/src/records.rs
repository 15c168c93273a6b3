//! Content record types
//!
//! Field names follow the hosted table columns (snake_case), so serde
//! round-trips match the wire shape of the table API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Visible only in the admin area
    Draft,
    /// Visible on the public site
    Published,
}

/// Shared read surface over both record types
///
/// Lets the filter and the media repair/prune scans treat blog posts and
/// portfolio items uniformly.
pub trait ContentRecord {
    /// Record title
    fn title(&self) -> &str;
    /// URL slug
    fn slug(&self) -> &str;
    /// Category label
    fn category(&self) -> &str;
    /// Publication status
    fn status(&self) -> RecordStatus;
    /// External URL or generated image key, if any
    fn featured_image(&self) -> Option<&str>;
    /// Column the table API orders listings by (newest first)
    fn sort_timestamp(&self) -> DateTime<Utc>;
}

/// A row of the `blog_posts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Row id
    pub id: Uuid,
    /// Post title
    pub title: String,
    /// URL slug, unique per table
    pub slug: String,
    /// Category label
    pub category: String,
    /// Publication status
    pub status: RecordStatus,
    /// External URL or generated image key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Short teaser shown in listings
    #[serde(default)]
    pub excerpt: String,
    /// Rendered body from the rich-text editor
    #[serde(default)]
    pub content: String,
    /// Set when the post is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    /// Create a draft post
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: slug.into(),
            category: category.into(),
            status: RecordStatus::Draft,
            featured_image: None,
            excerpt: String::new(),
            content: String::new(),
            published_at: None,
            created_at,
        }
    }

    /// Attach a featured image (external URL or generated key)
    #[must_use]
    pub fn with_featured_image(mut self, image: impl Into<String>) -> Self {
        self.featured_image = Some(image.into());
        self
    }

    /// Set the body content
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Mark the post published at the given instant
    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.status = RecordStatus::Published;
        self.published_at = Some(at);
        self
    }
}

impl ContentRecord for BlogPost {
    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn featured_image(&self) -> Option<&str> {
        self.featured_image.as_deref()
    }

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// A row of the `portfolios` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    /// Row id
    pub id: Uuid,
    /// Project title
    pub title: String,
    /// URL slug, unique per table
    pub slug: String,
    /// Category label (matches the placeholder table categories)
    pub category: String,
    /// Publication status
    pub status: RecordStatus,
    /// External URL or generated image key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Project description
    #[serde(default)]
    pub description: String,
    /// Link to the live project, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    /// Set when the item is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl PortfolioItem {
    /// Create a draft portfolio item
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: slug.into(),
            category: category.into(),
            status: RecordStatus::Draft,
            featured_image: None,
            description: String::new(),
            project_url: None,
            published_at: None,
            created_at,
        }
    }

    /// Attach a featured image (external URL or generated key)
    #[must_use]
    pub fn with_featured_image(mut self, image: impl Into<String>) -> Self {
        self.featured_image = Some(image.into());
        self
    }

    /// Link to the live project
    #[must_use]
    pub fn with_project_url(mut self, url: impl Into<String>) -> Self {
        self.project_url = Some(url.into());
        self
    }

    /// Mark the item published at the given instant
    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.status = RecordStatus::Published;
        self.published_at = Some(at);
        self
    }
}

impl ContentRecord for PortfolioItem {
    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn featured_image(&self) -> Option<&str> {
        self.featured_image.as_deref()
    }

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}
