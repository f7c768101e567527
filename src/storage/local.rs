use async_trait::async_trait;
use log::warn;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{Storage, StorageError, UploadResult, join_locator, sanitize_filename};
use crate::config::{FILE_UPLOAD_FOLDER, THUMBNAIL_UPLOAD_FOLDER};

/// Fallback-mode backend: files live under a configured uploads root and are
/// served back through `GET /uploads/{locator}`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Creates the uploads root and its fixed subdirectories up front, so
    /// every later write lands in an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();

        std::fs::create_dir_all(root.join(FILE_UPLOAD_FOLDER))?;
        std::fs::create_dir_all(root.join(THUMBNAIL_UPLOAD_FOLDER))?;

        Ok(Self { root })
    }

    fn full_path(&self, locator: &str) -> PathBuf {
        self.root.join(locator)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        data: Vec<u8>,
        folder: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        let filename = sanitize_filename(filename).ok_or(StorageError::InvalidFilename)?;
        let locator = join_locator(folder, &filename);
        let path = self.full_path(&locator);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // fs::write truncates, so a repeated upload overwrites in place.
        fs::write(&path, &data).await?;

        let url = self.resolve_url(&locator);

        Ok(UploadResult {
            filename,
            locator,
            url,
        })
    }

    fn resolve_url(&self, locator: &str) -> String {
        format!("/uploads/{}", locator)
    }

    async fn delete(&self, locator: &str) -> bool {
        match fs::remove_file(self.full_path(locator)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to delete local file {}: {}", locator, e);
                false
            }
        }
    }

    async fn exists(&self, locator: &str) -> bool {
        fs::try_exists(self.full_path(locator)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn new_creates_upload_subdirectories() {
        let (dir, _storage) = storage();
        assert!(dir.path().join(FILE_UPLOAD_FOLDER).is_dir());
        assert!(dir.path().join(THUMBNAIL_UPLOAD_FOLDER).is_dir());
    }

    #[tokio::test]
    async fn upload_writes_file_under_folder() {
        let (dir, storage) = storage();

        let result = storage
            .upload(b"%PDF-1.7".to_vec(), "pdfs", "story.pdf")
            .await
            .unwrap();

        assert_eq!(result.filename, "story.pdf");
        assert_eq!(result.locator, "pdfs/story.pdf");
        assert_eq!(result.url, "/uploads/pdfs/story.pdf");

        let written = std::fs::read(dir.path().join("pdfs/story.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn upload_sanitizes_traversal_attempts() {
        let (dir, storage) = storage();

        let result = storage
            .upload(b"data".to_vec(), "pdfs", "../outside.pdf")
            .await
            .unwrap();

        assert!(!result.filename.contains('/'));
        assert!(dir.path().join("pdfs").join(&result.filename).is_file());
        assert!(!dir.path().join("outside.pdf").exists());
    }

    #[tokio::test]
    async fn upload_rejects_unusable_filenames() {
        let (_dir, storage) = storage();

        let err = storage.upload(b"data".to_vec(), "pdfs", "...").await;
        assert!(matches!(err, Err(StorageError::InvalidFilename)));
    }

    #[tokio::test]
    async fn second_upload_overwrites_first() {
        let (dir, storage) = storage();

        storage
            .upload(b"first".to_vec(), "pdfs", "story.pdf")
            .await
            .unwrap();
        storage
            .upload(b"second".to_vec(), "pdfs", "story.pdf")
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("pdfs/story.pdf")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn delete_reports_success_and_failure() {
        let (_dir, storage) = storage();

        storage
            .upload(b"data".to_vec(), "pdfs", "story.pdf")
            .await
            .unwrap();

        assert!(storage.delete("pdfs/story.pdf").await);
        // Already gone; best-effort delete reports false rather than erroring.
        assert!(!storage.delete("pdfs/story.pdf").await);
    }

    #[tokio::test]
    async fn exists_probes_the_filesystem() {
        let (_dir, storage) = storage();

        assert!(!storage.exists("pdfs/story.pdf").await);

        storage
            .upload(b"data".to_vec(), "pdfs", "story.pdf")
            .await
            .unwrap();

        assert!(storage.exists("pdfs/story.pdf").await);
    }
}
