//! Vitrine content model
//!
//! Records for the two hosted tables (`blog_posts`, `portfolios`) and the
//! port through which the hosted backend is consumed. The backend itself is
//! an external collaborator: this crate only fixes the request/response
//! contract ("select rows filtered by status/category/slug, ordered by a
//! timestamp column" plus row insert/update/delete).
//!
//! # Core Concepts
//!
//! - [`BlogPost`] / [`PortfolioItem`]: rows of the two content tables
//! - [`ContentRecord`]: shared read surface over both record types
//! - [`RecordFilter`]: status/category/slug selection
//! - [`ContentBackend`]: async port for the hosted table API
//!
//! A record's optional `featured_image` field is either an external URL or
//! a generated image key. The record does not own the image's lifecycle:
//! deleting a record does not remove the image entry (cleanup is a separate,
//! best-effort concern in `vitrine-media`).

mod backend;
mod error;
mod filter;
mod records;

pub use backend::{ContentBackend, FeaturedImageRef};
pub use error::ContentError;
pub use filter::RecordFilter;
pub use records::{BlogPost, ContentRecord, PortfolioItem, RecordStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
