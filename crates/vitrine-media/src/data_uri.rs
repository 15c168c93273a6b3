//! Data-URI encoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw bytes as a `data:{mime};base64,...` string
///
/// The result is usable anywhere a resource path is expected. No size or
/// type constraint is enforced here; callers do their own checks.
#[must_use]
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// MIME type for a file extension
///
/// Unknown extensions fall back to `application/octet-stream`; the image is
/// still stored, matching the caller-enforced-checks-only contract.
#[must_use]
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
