//! Upload handling for point photos.
//!
//! A submission carries at most one image. The stored filename is the
//! upload timestamp (ISO-8601 with colons replaced to stay
//! filesystem-safe) prefixed to the sanitized original name, which keeps
//! names unique and sortable. Files are served statically under
//! `/uploads` by the router.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filesystem write failed.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),

    /// The image part carried no usable filename.
    #[error("image part is missing a filename")]
    MissingFilename,

    /// The image part was empty.
    #[error("image part is empty")]
    EmptyFile,
}

/// Blob store for uploaded point photos, rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `root`. The directory is created lazily by
    /// [`UploadStore::ensure_root`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this store writes into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the uploads directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Store one uploaded image, returning the stored filename.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::MissingFilename` if the sanitized original
    /// name is empty, `UploadError::EmptyFile` for a zero-byte part, and
    /// `UploadError::Io` if the write fails.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        let stored = stored_filename(Utc::now(), original_name)?;
        tokio::fs::write(self.root.join(&stored), bytes).await?;

        tracing::debug!(filename = %stored, size = bytes.len(), "stored upload");
        Ok(stored)
    }
}

/// Build the stored filename for an upload received at `now`.
///
/// # Errors
///
/// Returns `UploadError::MissingFilename` if nothing usable remains of the
/// original name after sanitization.
fn stored_filename(now: DateTime<Utc>, original_name: &str) -> Result<String, UploadError> {
    let name = sanitize(original_name);
    if name.is_empty() {
        return Err(UploadError::MissingFilename);
    }

    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");

    Ok(format!("{stamp}-{name}"))
}

/// Keep only the final path component of a client-supplied filename and
/// strip characters that could escape the uploads directory.
fn sanitize(original_name: &str) -> String {
    let last_component = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    last_component
        .chars()
        .filter(|c| !c.is_control() && *c != ':')
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_stored_filename_has_timestamp_prefix() {
        let name = stored_filename(sample_instant(), "photo.jpg").unwrap();
        assert_eq!(name, "2026-03-14T15-09-26.000Z-photo.jpg");
    }

    #[test]
    fn test_stored_filename_contains_no_colons() {
        let name = stored_filename(sample_instant(), "photo.jpg").unwrap();
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize("photo.jpg"), "photo.jpg");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(matches!(
            stored_filename(sample_instant(), "dir/"),
            Err(UploadError::MissingFilename)
        ));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let root = std::env::temp_dir().join(format!(
            "ecoponto-upload-test-{}",
            std::process::id()
        ));
        let store = UploadStore::new(&root);
        store.ensure_root().await.unwrap();

        let stored = store.save("photo.jpg", b"not-really-a-jpeg").await.unwrap();
        let written = tokio::fs::read(root.join(&stored)).await.unwrap();
        assert_eq!(written, b"not-really-a-jpeg");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_empty_file() {
        let store = UploadStore::new("unused");
        assert!(matches!(
            store.save("photo.jpg", b"").await,
            Err(UploadError::EmptyFile)
        ));
    }
}
