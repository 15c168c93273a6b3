//! Batch repair and prune heuristics
//!
//! Both scan the content backend's `featured_image` fields and reconcile
//! the local image entries against them, in opposite directions:
//!
//! - [`repair_missing_images`] fabricates a placeholder value for every
//!   referenced key with no stored data. It manufactures a value, it does
//!   not recover the original.
//! - [`prune_unreferenced`] deletes stored entries no record references.
//!
//! Running the two concurrently is unspecified: they share the
//! non-transactional store contract, so an interleaving resolves as
//! last-write-wins per key with no coordination.

use std::collections::HashSet;

use tracing::{info, warn};

use vitrine_content::ContentBackend;

use crate::key::is_image_key;
use crate::placeholder::placeholder_for;
use crate::store::ImageStore;

/// Outcome of a repair scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Generated keys referenced by content records
    pub scanned: usize,
    /// Keys that were missing and received a fabricated placeholder
    pub fixed: usize,
}

/// Outcome of a prune scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Stored image entries inspected
    pub scanned: usize,
    /// Entries removed because no record references them
    pub removed: usize,
}

/// Write a placeholder value under every referenced-but-missing image key
///
/// Backend failure is caught and logged; the scan then reports zero fixes
/// for this run. A key counts as fixed only when the placeholder landed in
/// both scopes.
pub async fn repair_missing_images(
    backend: &dyn ContentBackend,
    images: &ImageStore,
) -> RepairReport {
    let refs = match backend.featured_image_refs().await {
        Ok(refs) => refs,
        Err(err) => {
            warn!(%err, "image repair scan skipped: backend unavailable");
            return RepairReport::default();
        }
    };

    let mut report = RepairReport::default();
    for image_ref in refs {
        if !is_image_key(&image_ref.image) {
            continue; // external URL, nothing to repair
        }
        report.scanned += 1;
        if images.get(&image_ref.image).is_some() {
            continue;
        }
        let placeholder = placeholder_for(&image_ref.title, &image_ref.category);
        match images.write_both(&image_ref.image, placeholder) {
            Ok(()) => report.fixed += 1,
            Err(err) => warn!(key = %image_ref.image, %err, "placeholder not written"),
        }
    }

    info!(scanned = report.scanned, fixed = report.fixed, "image repair scan finished");
    report
}

/// Remove stored image entries that no content record references
///
/// Backend failure is caught and logged; nothing is removed for this run.
pub async fn prune_unreferenced(backend: &dyn ContentBackend, images: &ImageStore) -> PruneReport {
    let refs = match backend.featured_image_refs().await {
        Ok(refs) => refs,
        Err(err) => {
            warn!(%err, "image prune scan skipped: backend unavailable");
            return PruneReport::default();
        }
    };

    let referenced: HashSet<String> = refs
        .into_iter()
        .filter(|r| is_image_key(&r.image))
        .map(|r| r.image)
        .collect();

    let mut report = PruneReport::default();
    for key in images.image_keys() {
        report.scanned += 1;
        if !referenced.contains(&key) {
            images.remove(&key);
            report.removed += 1;
        }
    }

    info!(scanned = report.scanned, removed = report.removed, "image prune scan finished");
    report
}
