use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;

pub mod local;
pub mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid filename")]
    InvalidFilename,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result of a single upload. Transient; callers copy the fields they need
/// onto the owning record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Sanitized filename the object was stored under.
    pub filename: String,
    /// Backend-specific reference: a path relative to the uploads root, or an
    /// object key.
    pub locator: String,
    /// Servable URL for the stored object.
    pub url: String,
}

/// Uniform contract over the two storage backends. Callers hold
/// `Arc<dyn Storage>` and never branch on backend identity; the branching
/// happens once, in [`from_config`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `folder/filename`, overwriting any existing object at that
    /// locator. Backend failures propagate.
    async fn upload(
        &self,
        data: Vec<u8>,
        folder: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError>;

    /// Deterministic URL construction. No I/O, no existence guarantee.
    fn resolve_url(&self, locator: &str) -> String;

    /// Best-effort delete; backend failures are reported as `false`, never
    /// raised.
    async fn delete(&self, locator: &str) -> bool;

    /// Best-effort probe; backend failures read as absent.
    async fn exists(&self, locator: &str) -> bool;
}

/// Picks the backend once at process start: S3 when the remote credential is
/// configured, local filesystem under the uploads root otherwise.
pub async fn from_config(config: &Config) -> Result<Arc<dyn Storage>, StorageError> {
    if config.remote_storage_enabled() {
        Ok(Arc::new(S3Storage::connect(&config.storage_bucket).await?))
    } else {
        Ok(Arc::new(LocalStorage::new(&config.upload_dir)?))
    }
}

/// Strips path separators and control characters from a client-supplied
/// filename. Returns `None` when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let cleaned: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Extension-based MIME lookup; unknown extensions map to the generic binary
/// type.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub(crate) fn join_locator(folder: &str, filename: &str) -> String {
    if folder.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", folder, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("story.pdf"), Some("story.pdf".to_string()));
        assert_eq!(
            sanitize_filename("my deck (final).pptx"),
            Some("my deck (final).pptx".to_string())
        );
    }

    #[test]
    fn sanitize_strips_path_separators() {
        let cleaned = sanitize_filename("../etc/passwd").unwrap();
        assert!(!cleaned.contains('/'));
        assert!(!cleaned.starts_with('.'));

        let cleaned = sanitize_filename("..\\windows\\system32").unwrap();
        assert!(!cleaned.contains('\\'));
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_filename("a\0b\n.pdf"), Some("ab.pdf".to_string()));
    }

    #[test]
    fn sanitize_rejects_empty_results() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("  . "), None);
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for("deck.pdf"), "application/pdf");
        assert_eq!(content_type_for("thumb.png"), "image/png");
        assert_eq!(
            content_type_for("deck.pptx"),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
    }

    #[test]
    fn unknown_extension_maps_to_octet_stream() {
        assert_eq!(content_type_for("mystery.xyzzy"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn locator_joins_folder_and_filename() {
        assert_eq!(join_locator("pdfs", "a.pdf"), "pdfs/a.pdf");
        assert_eq!(join_locator("", "a.pdf"), "a.pdf");
    }
}
