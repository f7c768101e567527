use std::env;
use std::path::PathBuf;

/// Folder (and blob prefix) for primary story documents.
pub const FILE_UPLOAD_FOLDER: &str = "pdfs";
/// Folder (and blob prefix) for thumbnail images.
pub const THUMBNAIL_UPLOAD_FOLDER: &str = "thumbnails";
/// Directory served by `GET /processed/{name}`.
pub const PROCESSED_DIR: &str = "processed";

const DEFAULT_BUCKET: &str = "pdf-stories";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration, read from the environment exactly once at startup
/// and handed to every component that needs it.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Remote-storage credential; when present, all storage operations target
    /// the S3 backend. Absent means local fallback mode.
    pub aws_access_key: Option<String>,
    pub storage_bucket: String,
    pub upload_dir: PathBuf,
    pub secret_key: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            aws_access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            secret_key: env::var("SECRET_KEY").expect("SECRET_KEY must be set"),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Backend selection is keyed off the credential alone; the bucket name
    /// always has a default.
    pub fn remote_storage_enabled(&self) -> bool {
        self.aws_access_key.is_some()
    }
}
