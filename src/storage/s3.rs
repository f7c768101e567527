use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use log::{debug, info, warn};

use super::{Storage, StorageError, UploadResult, content_type_for, join_locator, sanitize_filename};

/// Remote backend: objects in an S3 bucket, addressed by key and served via
/// their public object URL.
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3Storage {
    /// Loads AWS configuration from the environment and makes sure the bucket
    /// exists before the first upload.
    pub async fn connect(bucket: &str) -> Result<Self, StorageError> {
        let aws_cfg = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let region = aws_cfg
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        let client = Client::new(&aws_cfg);

        let storage = Self {
            client,
            bucket: bucket.to_string(),
            region,
        };
        storage.ensure_bucket_exists().await;

        Ok(storage)
    }

    /// Best-effort bucket creation; "already exists" answers are fine.
    async fn ensure_bucket_exists(&self) {
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => info!("Created storage bucket '{}'", self.bucket),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    debug!("Bucket '{}' already exists", self.bucket);
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket, service_err
                    );
                }
            }
        }
    }
}

/// Virtual-hosted-style object URL. Pure string construction; existence is
/// not checked.
fn object_url(bucket: &str, region: &str, locator: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, locator)
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        data: Vec<u8>,
        folder: &str,
        filename: &str,
    ) -> Result<UploadResult, StorageError> {
        let filename = sanitize_filename(filename).ok_or(StorageError::InvalidFilename)?;
        let locator = join_locator(folder, &filename);
        let content_type = content_type_for(&filename);

        // put_object overwrites an existing key, matching the local backend.
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&locator)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let url = self.resolve_url(&locator);

        Ok(UploadResult {
            filename,
            locator,
            url,
        })
    }

    fn resolve_url(&self, locator: &str) -> String {
        object_url(&self.bucket, &self.region, locator)
    }

    async fn delete(&self, locator: &str) -> bool {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(locator)
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to delete object {}: {}", locator, e);
                false
            }
        }
    }

    async fn exists(&self, locator: &str) -> bool {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(locator)
            .send()
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_is_deterministic() {
        assert_eq!(
            object_url("pdf-stories", "us-east-1", "pdfs/story.pdf"),
            "https://pdf-stories.s3.us-east-1.amazonaws.com/pdfs/story.pdf"
        );
    }
}
