//! Image store
//!
//! Saves an uploaded image as a data-URI string under a generated key in
//! both storage scopes and relays the new entry to the other tabs.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use vitrine_store::{Clock, KeyValueStore, StoreScope};

use crate::broadcaster::Broadcaster;
use crate::data_uri::{mime_for_extension, to_data_uri};
use crate::error::MediaError;
use crate::key::{is_image_key, ImageKey};

/// Dual-scope image storage for one tab
pub struct ImageStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    broadcaster: Option<Arc<Broadcaster>>,
}

impl ImageStore {
    /// Create a store without a cross-tab relay
    #[must_use]
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            durable,
            session,
            clock,
            broadcaster: None,
        }
    }

    /// Relay successful saves through the given broadcaster
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Encode and save an image, returning its generated key
    ///
    /// The data URI lands in both scopes; on success the pair is relayed to
    /// the other tabs. UI flows treat a failure as "no image provided".
    ///
    /// # Errors
    /// Returns [`MediaError::Store`] when either scope rejects the write
    /// (typically quota). The failure is also logged here so the caller can
    /// stay on its happy path with a plain `?`/`is_err` check.
    pub fn save_bytes(&self, bytes: &[u8], mime: &str) -> Result<ImageKey, MediaError> {
        let value = to_data_uri(bytes, mime);
        let key = ImageKey::generate(self.clock.as_ref());
        let key_str = key.to_string();

        if let Err(err) = self.write_both(&key_str, &value) {
            warn!(key = %key_str, %err, "image save failed");
            return Err(err);
        }

        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.publish(&key_str, &value);
        }
        debug!(key = %key_str, bytes = bytes.len(), "image saved");
        Ok(key)
    }

    /// Read an image file and save it, sniffing the MIME type from the
    /// extension
    ///
    /// # Errors
    /// Returns [`MediaError::Io`] when the file cannot be read, or the
    /// [`save_bytes`](Self::save_bytes) storage errors.
    pub async fn save_file(&self, path: impl AsRef<Path>) -> Result<ImageKey, MediaError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");
        self.save_bytes(&bytes, mime)
    }

    /// Look up a stored image value
    ///
    /// Durable scope first, then session. A missing key is expected (the
    /// fallback resolver takes over), not an error.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.durable.get(key).or_else(|| self.session.get(key))
    }

    /// Remove an entry from both scopes
    pub fn remove(&self, key: &str) {
        self.durable.remove(key);
        self.session.remove(key);
    }

    /// All generated image keys present in either scope
    #[must_use]
    pub fn image_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .durable
            .keys()
            .into_iter()
            .filter(|k| is_image_key(k))
            .collect();
        for key in self.session.keys() {
            if is_image_key(&key) && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Write a pair into both scopes, failing on the first rejected write
    pub(crate) fn write_both(&self, key: &str, value: &str) -> Result<(), MediaError> {
        for (scope, store) in [
            (StoreScope::Durable, &self.durable),
            (StoreScope::Session, &self.session),
        ] {
            store.set(key, value).map_err(|err| {
                warn!(key, %scope, %err, "storage write rejected");
                MediaError::from(err)
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("relayed", &self.broadcaster.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use vitrine_store::{ManualClock, MemoryStore};

    fn store_at(millis: i64) -> (ImageStore, Arc<MemoryStore>, Arc<MemoryStore>) {
        let durable = Arc::new(MemoryStore::new(StoreScope::Durable));
        let session = Arc::new(MemoryStore::new(StoreScope::Session));
        let clock = Arc::new(ManualClock::at_millis(millis));
        let images = ImageStore::new(durable.clone(), session.clone(), clock);
        (images, durable, session)
    }

    #[test]
    fn save_then_get_returns_exact_data_uri() {
        let (images, _, _) = store_at(1_700_000_000_000);
        let key = images.save_bytes(b"fake-png-bytes", "image/png").unwrap();

        let expected = to_data_uri(b"fake-png-bytes", "image/png");
        assert_eq!(images.get(&key.to_string()), Some(expected));
        assert!(key.to_string().starts_with("portfolio-image-1700000000000-"));
    }

    #[test]
    fn save_writes_both_scopes() {
        let (images, durable, session) = store_at(0);
        let key = images.save_bytes(b"x", "image/webp").unwrap().to_string();
        assert!(durable.contains(&key));
        assert!(session.contains(&key));
    }

    #[test]
    fn get_falls_back_to_session_scope() {
        let (images, durable, session) = store_at(0);
        session.set("portfolio-image-5-abcdef", "data:image/png;base64,aa").unwrap();
        assert!(durable.is_empty());
        assert_eq!(
            images.get("portfolio-image-5-abcdef"),
            Some("data:image/png;base64,aa".to_string())
        );
    }

    #[test]
    fn missing_key_is_none_not_error() {
        let (images, _, _) = store_at(0);
        assert_eq!(images.get("portfolio-image-9-zzzzzz"), None);
    }

    #[test]
    fn quota_failure_surfaces_as_error() {
        let durable = Arc::new(MemoryStore::with_quota(StoreScope::Durable, 16));
        let session = Arc::new(MemoryStore::new(StoreScope::Session));
        let clock = Arc::new(ManualClock::at_millis(0));
        let images = ImageStore::new(durable, session, clock);

        let result = images.save_bytes(&[0u8; 256], "image/png");
        assert!(matches!(result, Err(MediaError::Store(_))));
    }

    #[test]
    fn image_keys_unions_scopes_and_skips_foreign_keys() {
        let (images, durable, session) = store_at(0);
        durable.set("portfolio-image-1-aaaaaa", "d1").unwrap();
        durable.set("vitrine-cache:lang", "en").unwrap();
        session.set("portfolio-image-1-aaaaaa", "d1").unwrap();
        session.set("portfolio-image-2-bbbbbb", "d2").unwrap();

        let mut keys = images.image_keys();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "portfolio-image-1-aaaaaa".to_string(),
                "portfolio-image-2-bbbbbb".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn save_file_sniffs_mime_from_extension() {
        let (images, _, _) = store_at(0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.webp");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"webp-bytes").unwrap();

        let key = images.save_file(&path).await.unwrap();
        let stored = images.get(&key.to_string()).unwrap();
        assert!(stored.starts_with("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn save_file_missing_path_is_io_error() {
        let (images, _, _) = store_at(0);
        let result = images.save_file("/nonexistent/upload.png").await;
        assert!(matches!(result, Err(MediaError::Io(_))));
    }
}
