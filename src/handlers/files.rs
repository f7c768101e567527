use crate::config::{Config, PROCESSED_DIR};
use actix_web::http::header;
use actix_web::{Error, HttpResponse, web};
use std::path::{Component, Path, PathBuf};

/// Joins a request-supplied relative path under a serving root, rejecting
/// anything that could escape it.
fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join(rel))
}

async fn stream_file(path: PathBuf) -> Result<HttpResponse, Error> {
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| actix_web::error::ErrorNotFound("File not found"))?;

    let content_type = mime_guess::from_path(&path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let stream = tokio_util::io::ReaderStream::new(file);

    Ok(HttpResponse::Ok()
        .append_header((header::CONTENT_TYPE, content_type))
        .streaming(stream))
}

/// GET /uploads/{path}
/// Serves a file written by the local backend; only meaningful in fallback
/// mode.
pub async fn uploaded_file(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let full = safe_join(&config.upload_dir, &path)
        .ok_or_else(|| actix_web::error::ErrorNotFound("File not found"))?;

    stream_file(full).await
}

/// GET /processed/{name}
/// Serves a file from the fixed processing output directory.
pub async fn processed_file(name: web::Path<String>) -> Result<HttpResponse, Error> {
    let full = safe_join(Path::new(PROCESSED_DIR), &name)
        .ok_or_else(|| actix_web::error::ErrorNotFound("File not found"))?;

    stream_file(full).await
}

/// GET /download/{name}
/// Download-confirmation payload referencing the processed file.
pub async fn download_page(name: web::Path<String>) -> HttpResponse {
    let name = name.into_inner();

    HttpResponse::Ok().json(serde_json::json!({
        "filename": name,
        "download_url": format!("/processed/{}", name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_accepts_nested_relative_paths() {
        let root = Path::new("uploads");
        assert_eq!(
            safe_join(root, "pdfs/story.pdf"),
            Some(PathBuf::from("uploads/pdfs/story.pdf"))
        );
    }

    #[test]
    fn safe_join_rejects_traversal() {
        let root = Path::new("uploads");
        assert_eq!(safe_join(root, "../secrets.txt"), None);
        assert_eq!(safe_join(root, "pdfs/../../secrets.txt"), None);
        assert_eq!(safe_join(root, "/etc/passwd"), None);
    }
}
