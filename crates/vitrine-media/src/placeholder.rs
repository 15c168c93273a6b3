//! Fallback resolver
//!
//! When an image key cannot be found in either scope, a placeholder is
//! substituted by matching the record's title, then its category, against
//! static lookup tables. Resolution is total: some displayable string always
//! comes back, trading correctness for availability.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::trace;

use crate::key::is_image_key;
use crate::store::ImageStore;

/// Generic placeholder used when neither table matches
pub const DEFAULT_PLACEHOLDER: &str = "/placeholder.svg";

/// Known content titles mapped to placeholder assets
///
/// Literal strings from the site content, typos included; these must match
/// record titles exactly.
static TITLE_PLACEHOLDERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("HealtCare", "/Healthcare.webp"),
        ("Online Learning Platform", "/Education.webp"),
        ("Restaurant Ordering App", "/Food-Beverage.webp"),
        ("Fintech Dashboard", "/Finance.webp"),
        ("Agency Website Redesign", "/Web-Development.webp"),
    ])
});

/// Category labels mapped to placeholder assets
static CATEGORY_PLACEHOLDERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Web Development", "/Web-Development.webp"),
        ("Healthcare", "/Healthcare.webp"),
        ("Restaurant", "/Food-Beverage.webp"),
        ("Education", "/Education.webp"),
        ("Finance", "/Finance.webp"),
        ("default", DEFAULT_PLACEHOLDER),
    ])
});

/// Pick a placeholder asset for a record: title table first, then category,
/// then the generic default
#[must_use]
pub fn placeholder_for(title: &str, category: &str) -> &'static str {
    if let Some(path) = TITLE_PLACEHOLDERS.get(title) {
        return path;
    }
    if let Some(path) = CATEGORY_PLACEHOLDERS.get(category) {
        return path;
    }
    DEFAULT_PLACEHOLDER
}

/// Resolve a displayable image string for a content record
///
/// - Empty `image` field: straight to placeholder selection.
/// - External URL or asset path (not a generated key): returned verbatim.
/// - Generated key: store lookup, verbatim on hit; placeholder on miss.
///
/// Never fails and never returns an empty string.
#[must_use]
pub fn resolve_display_image(
    images: &ImageStore,
    image: &str,
    category: &str,
    title: &str,
) -> String {
    if image.is_empty() {
        return placeholder_for(title, category).to_string();
    }
    if !is_image_key(image) {
        // External URL or static asset path on the record itself.
        return image.to_string();
    }
    match images.get(image) {
        Some(value) => value,
        None => {
            trace!(key = image, title, category, "image key missing, substituting placeholder");
            placeholder_for(title, category).to_string()
        }
    }
}
