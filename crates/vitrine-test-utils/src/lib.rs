//! Testing utilities for the Vitrine workspace
//!
//! Shared fixtures: an in-memory content backend honoring the filter and
//! ordering contract, a frozen clock helper, and record builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use vitrine_content::{
    BlogPost, ContentBackend, ContentError, ContentRecord, FeaturedImageRef, PortfolioItem,
    RecordFilter,
};
use vitrine_store::ManualClock;

/// A frozen clock at a fixed, readable instant (2023-11-14T22:13:20Z)
pub fn manual_clock() -> ManualClock {
    ManualClock::at_millis(1_700_000_000_000)
}

pub fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).expect("millis in representable range")
}

pub fn published_post(title: &str, slug: &str, category: &str, at_millis: i64) -> BlogPost {
    BlogPost::new(title, slug, category, timestamp(at_millis)).published(timestamp(at_millis))
}

pub fn published_portfolio(
    title: &str,
    slug: &str,
    category: &str,
    at_millis: i64,
) -> PortfolioItem {
    PortfolioItem::new(title, slug, category, timestamp(at_millis)).published(timestamp(at_millis))
}

/// In-memory [`ContentBackend`] for tests
///
/// Honors the table-API contract: filtered listings come back ordered by
/// the timestamp column, newest first. `fail_next` makes the next call
/// return a backend error, for exercising degraded paths.
#[derive(Default)]
pub struct MemoryBackend {
    posts: RwLock<Vec<BlogPost>>,
    portfolio: RwLock<Vec<PortfolioItem>>,
    fail_next: RwLock<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<BlogPost>) -> Self {
        Self {
            posts: RwLock::new(posts),
            ..Self::default()
        }
    }

    pub fn with_portfolio(items: Vec<PortfolioItem>) -> Self {
        Self {
            portfolio: RwLock::new(items),
            ..Self::default()
        }
    }

    /// Make the next backend call fail
    pub fn fail_next(&self) {
        *self.fail_next.write() = true;
    }

    fn check_failure(&self) -> Result<(), ContentError> {
        let mut flag = self.fail_next.write();
        if *flag {
            *flag = false;
            return Err(ContentError::Backend("simulated outage".to_string()));
        }
        Ok(())
    }

    fn sorted<R: ContentRecord + Clone>(records: &[R], filter: &RecordFilter) -> Vec<R> {
        let mut matched: Vec<R> = records.iter().filter(|r| filter.matches(*r)).cloned().collect();
        matched.sort_by_key(|r| std::cmp::Reverse(r.sort_timestamp()));
        matched
    }
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    async fn list_posts(&self, filter: &RecordFilter) -> Result<Vec<BlogPost>, ContentError> {
        self.check_failure()?;
        Ok(Self::sorted(self.posts.read().as_slice(), filter))
    }

    async fn get_post(&self, slug: &str) -> Result<BlogPost, ContentError> {
        self.check_failure()?;
        self.posts
            .read()
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| ContentError::not_found(slug))
    }

    async fn insert_post(&self, post: BlogPost) -> Result<(), ContentError> {
        self.check_failure()?;
        self.posts.write().push(post);
        Ok(())
    }

    async fn update_post(&self, post: BlogPost) -> Result<(), ContentError> {
        self.check_failure()?;
        let mut posts = self.posts.write();
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                *existing = post;
                Ok(())
            }
            None => Err(ContentError::not_found(post.slug)),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), ContentError> {
        self.check_failure()?;
        self.posts.write().retain(|p| p.id != id);
        Ok(())
    }

    async fn list_portfolio(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<PortfolioItem>, ContentError> {
        self.check_failure()?;
        Ok(Self::sorted(self.portfolio.read().as_slice(), filter))
    }

    async fn get_portfolio(&self, slug: &str) -> Result<PortfolioItem, ContentError> {
        self.check_failure()?;
        self.portfolio
            .read()
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| ContentError::not_found(slug))
    }

    async fn insert_portfolio(&self, item: PortfolioItem) -> Result<(), ContentError> {
        self.check_failure()?;
        self.portfolio.write().push(item);
        Ok(())
    }

    async fn update_portfolio(&self, item: PortfolioItem) -> Result<(), ContentError> {
        self.check_failure()?;
        let mut items = self.portfolio.write();
        match items.iter_mut().find(|p| p.id == item.id) {
            Some(existing) => {
                *existing = item;
                Ok(())
            }
            None => Err(ContentError::not_found(item.slug)),
        }
    }

    async fn delete_portfolio(&self, id: Uuid) -> Result<(), ContentError> {
        self.check_failure()?;
        self.portfolio.write().retain(|p| p.id != id);
        Ok(())
    }

    async fn featured_image_refs(&self) -> Result<Vec<FeaturedImageRef>, ContentError> {
        self.check_failure()?;
        let mut refs: Vec<FeaturedImageRef> = self
            .posts
            .read()
            .iter()
            .filter_map(FeaturedImageRef::from_record)
            .collect();
        refs.extend(
            self.portfolio
                .read()
                .iter()
                .filter_map(FeaturedImageRef::from_record),
        );
        Ok(refs)
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("posts", &self.posts.read().len())
            .field("portfolio", &self.portfolio.read().len())
            .finish()
    }
}
