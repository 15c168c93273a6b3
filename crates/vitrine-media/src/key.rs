//! Generated image keys
//!
//! Keys have the shape `portfolio-image-{unix_millis}-{suffix}` with a
//! six-character lowercase base-36 suffix. They are unique within a browser
//! profile for any practical purpose; there is no global registry.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rand::Rng;
use vitrine_store::Clock;

/// Prefix shared by all generated image keys
pub const KEY_PREFIX: &str = "portfolio-image-";

/// Length of the random suffix
const SUFFIX_LEN: usize = 6;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A generated image key
///
/// Derives from the creation instant plus a random suffix, so keys sort
/// roughly by creation time and collisions need the same millisecond and
/// the same six-character draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    millis: i64,
    suffix: String,
}

impl ImageKey {
    /// Generate a key stamped with the clock's current instant
    #[must_use]
    pub fn generate(clock: &dyn Clock) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self {
            millis: clock.now_millis(),
            suffix,
        }
    }

    /// Reassemble a key from its parts
    ///
    /// # Errors
    /// Returns [`ImageKeyError::Malformed`] if the suffix is not lowercase
    /// base-36.
    pub fn from_parts(millis: i64, suffix: &str) -> Result<Self, ImageKeyError> {
        if suffix.is_empty()
            || !suffix
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(ImageKeyError::Malformed {
                input: format!("{KEY_PREFIX}{millis}-{suffix}"),
            });
        }
        Ok(Self {
            millis,
            suffix: suffix.to_string(),
        })
    }

    /// Creation instant in unix milliseconds
    #[inline]
    #[must_use]
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Random suffix
    #[inline]
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Display for ImageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{KEY_PREFIX}{}-{}", self.millis, self.suffix)
    }
}

impl FromStr for ImageKey {
    type Err = ImageKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(KEY_PREFIX)
            .ok_or_else(|| ImageKeyError::MissingPrefix {
                input: s.to_string(),
            })?;
        let (millis, suffix) = rest.split_once('-').ok_or_else(|| ImageKeyError::Malformed {
            input: s.to_string(),
        })?;
        let millis: i64 = millis.parse().map_err(|_| ImageKeyError::Malformed {
            input: s.to_string(),
        })?;
        Self::from_parts(millis, suffix)
    }
}

/// Whether a string field holds a generated image key (as opposed to an
/// external URL or asset path)
#[inline]
#[must_use]
pub fn is_image_key(value: &str) -> bool {
    value.starts_with(KEY_PREFIX)
}

/// Errors parsing an image key
#[derive(Debug, thiserror::Error)]
pub enum ImageKeyError {
    /// Input does not start with [`KEY_PREFIX`]
    #[error("not an image key (missing prefix): {input}")]
    MissingPrefix {
        /// The rejected input
        input: String,
    },

    /// Input has the prefix but not the `{millis}-{suffix}` shape
    #[error("malformed image key: {input}")]
    Malformed {
        /// The rejected input
        input: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vitrine_store::ManualClock;

    #[test]
    fn generated_key_shape() {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let key = ImageKey::generate(&clock);
        assert_eq!(key.millis(), 1_700_000_000_000);
        assert_eq!(key.suffix().len(), 6);
        assert!(key.to_string().starts_with("portfolio-image-1700000000000-"));
    }

    #[test]
    fn display_and_parse_round_trip() {
        let key: ImageKey = "portfolio-image-1700000000000-abc123".parse().unwrap();
        assert_eq!(key.millis(), 1_700_000_000_000);
        assert_eq!(key.suffix(), "abc123");
        assert_eq!(key.to_string(), "portfolio-image-1700000000000-abc123");
    }

    #[test]
    fn rejects_foreign_strings() {
        assert!(matches!(
            "https://example.com/a.png".parse::<ImageKey>(),
            Err(ImageKeyError::MissingPrefix { .. })
        ));
        assert!(matches!(
            "portfolio-image-notanumber".parse::<ImageKey>(),
            Err(ImageKeyError::Malformed { .. })
        ));
        assert!(matches!(
            "portfolio-image-123-UPPER".parse::<ImageKey>(),
            Err(ImageKeyError::Malformed { .. })
        ));
    }

    #[test]
    fn is_image_key_by_prefix() {
        assert!(is_image_key("portfolio-image-1-abc123"));
        assert!(!is_image_key("/placeholder.svg"));
        assert!(!is_image_key("https://example.com/img.webp"));
        assert!(!is_image_key(""));
    }

    #[test]
    fn distinct_suffixes_within_one_millisecond() {
        let clock = ManualClock::at_millis(0);
        let a = ImageKey::generate(&clock);
        let b = ImageKey::generate(&clock);
        // Same timestamp; collision would need the same 6-char draw.
        assert_eq!(a.millis(), b.millis());
        assert_ne!(a.to_string(), b.to_string());
    }

    proptest! {
        #[test]
        fn parse_accepts_any_generated_form(millis in 0i64..=4_102_444_800_000, suffix in "[a-z0-9]{6}") {
            let key = ImageKey::from_parts(millis, &suffix).unwrap();
            let parsed: ImageKey = key.to_string().parse().unwrap();
            prop_assert_eq!(parsed, key);
        }
    }
}
