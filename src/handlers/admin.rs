use crate::auth::jwt::AdminUser;
use crate::auth::password::hash_password;
use crate::config::{FILE_UPLOAD_FOLDER, THUMBNAIL_UPLOAD_FOLDER};
use crate::database::DbPool;
use crate::models::stories::{NewStory, StoryChangeset};
use crate::models::tags::NewTag;
use crate::models::users::NewUser;
use crate::repositories::{stories as story_repo, tags as tag_repo, users as user_repo};
use crate::requests::admin::{TagPayload, UserPayload};
use crate::storage::{Storage, UploadResult};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use futures_util::TryStreamExt;
use log::error;

fn internal(e: diesel::result::Error) -> Error {
    actix_web::error::ErrorInternalServerError(format!("Database error: {}", e))
}

fn not_found_or_internal(e: diesel::result::Error) -> Error {
    match e {
        diesel::result::Error::NotFound => actix_web::error::ErrorNotFound("Not found"),
        _ => internal(e),
    }
}

fn conflict_or_internal(e: diesel::result::Error) -> Error {
    match e {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => actix_web::error::ErrorConflict("Name already in use"),
        _ => internal(e),
    }
}

/// GET /admin
/// Console landing payload: record counts per collection.
pub async fn index(_admin: AdminUser, pool: web::Data<DbPool>) -> Result<HttpResponse, Error> {
    let stories = story_repo::count_stories(&pool).map_err(internal)?;
    let tags = tag_repo::count_tags(&pool).map_err(internal)?;
    let users = user_repo::count_users(&pool).map_err(internal)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "stories": stories,
        "tags": tags,
        "users": users,
    })))
}

// ---------------------------------------------------------------------------
// Story CRUD
// ---------------------------------------------------------------------------

/// One uploaded file as pulled out of a multipart field.
struct FileUpload {
    filename: String,
    data: Vec<u8>,
}

/// Parsed admin story form. Only user-editable fields appear here;
/// `filename`, `path`, the thumbnail fields and `uploaded_at` are derived
/// from upload side effects or system defaults.
#[derive(Default)]
struct StoryForm {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    created_at: Option<NaiveDateTime>,
    tag_ids: Option<Vec<i32>>,
    file_upload: Option<FileUpload>,
    thumbnail_upload: Option<FileUpload>,
}

async fn read_field_bytes(field: &mut actix_multipart::Field) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_field_text(field: &mut actix_multipart::Field) -> Result<Option<String>, Error> {
    let data = read_field_bytes(field).await?;
    let text = String::from_utf8(data)
        .map_err(|_| actix_web::error::ErrorBadRequest("Form field is not valid UTF-8"))?;
    let text = text.trim().to_string();

    Ok(if text.is_empty() { None } else { Some(text) })
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_tag_ids(text: &str) -> Result<Vec<i32>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().map_err(|_| format!("Invalid tag id: {}", s)))
        .collect()
}

async fn read_story_form(mut payload: Multipart) -> Result<StoryForm, Error> {
    let mut form = StoryForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match name.as_str() {
            "file_upload" | "thumbnail_upload" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();
                let data = read_field_bytes(&mut field).await?;
                // Browsers submit an empty part for an untouched file input.
                if data.is_empty() {
                    continue;
                }

                let upload = FileUpload { filename, data };
                if name == "file_upload" {
                    form.file_upload = Some(upload);
                } else {
                    form.thumbnail_upload = Some(upload);
                }
            }
            "title" => form.title = read_field_text(&mut field).await?,
            "description" => form.description = read_field_text(&mut field).await?,
            "author" => form.author = read_field_text(&mut field).await?,
            "created_at" => {
                if let Some(text) = read_field_text(&mut field).await? {
                    let parsed = parse_datetime(&text).ok_or_else(|| {
                        actix_web::error::ErrorBadRequest(format!(
                            "Unrecognized created_at value: {}",
                            text
                        ))
                    })?;
                    form.created_at = Some(parsed);
                }
            }
            "tags" => {
                if let Some(text) = read_field_text(&mut field).await? {
                    let ids = parse_tag_ids(&text).map_err(actix_web::error::ErrorBadRequest)?;
                    form.tag_ids = Some(ids);
                }
            }
            _ => {
                // Drain unknown fields so the multipart stream can continue.
                read_field_bytes(&mut field).await?;
            }
        }
    }

    Ok(form)
}

fn ensure_tags_exist(pool: &DbPool, tag_ids: &[i32]) -> Result<(), Error> {
    for &tag_id in tag_ids {
        tag_repo::find_tag_by_id(pool, tag_id).map_err(|e| match e {
            diesel::result::Error::NotFound => {
                actix_web::error::ErrorBadRequest(format!("Unknown tag id: {}", tag_id))
            }
            _ => internal(e),
        })?;
    }
    Ok(())
}

async fn store_upload(
    storage: &dyn Storage,
    upload: FileUpload,
    folder: &str,
) -> Result<UploadResult, Error> {
    let FileUpload { filename, data } = upload;

    storage.upload(data, folder, &filename).await.map_err(|e| {
        error!("Upload to {} failed: {}", folder, e);
        actix_web::error::ErrorInternalServerError(format!("Upload failed: {}", e))
    })
}

/// GET /admin/stories
pub async fn list_stories(_admin: AdminUser, pool: web::Data<DbPool>) -> Result<HttpResponse, Error> {
    let stories = story_repo::load_all_stories(&pool).map_err(internal)?;

    Ok(HttpResponse::Ok().json(stories))
}

/// GET /admin/stories/{id}
pub async fn get_story(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    story_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let story =
        story_repo::find_story_by_id(&pool, story_id.into_inner()).map_err(not_found_or_internal)?;

    Ok(HttpResponse::Ok().json(story))
}

/// POST /admin/stories
/// Creates a story from a multipart form. The main document upload is
/// required; files are written to storage first and the record committed
/// second.
pub async fn create_story(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn Storage>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let form = read_story_form(payload).await?;

    let Some(file) = form.file_upload else {
        return Err(actix_web::error::ErrorBadRequest("A main file upload is required"));
    };

    if let Some(tag_ids) = &form.tag_ids {
        ensure_tags_exist(&pool, tag_ids)?;
    }

    let document = store_upload(storage.get_ref(), file, FILE_UPLOAD_FOLDER).await?;

    let thumbnail = match form.thumbnail_upload {
        Some(thumb) => {
            match store_upload(storage.get_ref(), thumb, THUMBNAIL_UPLOAD_FOLDER).await {
                Ok(result) => Some(result),
                Err(e) => {
                    storage.delete(&document.locator).await;
                    return Err(e);
                }
            }
        }
        None => None,
    };

    let new_story = NewStory {
        filename: document.filename.clone(),
        path: document.locator.clone(),
        title: form.title,
        description: form.description,
        author: form.author,
        thumbnail_filename: thumbnail.as_ref().map(|t| t.filename.clone()),
        thumbnail_path: thumbnail.as_ref().map(|t| t.locator.clone()),
        created_at: form.created_at,
        uploaded_at: Utc::now().naive_utc(),
    };

    let story = match story_repo::insert_story(&pool, &new_story) {
        Ok(story) => story,
        Err(e) => {
            // Record commit failed; remove the objects written above.
            storage.delete(&document.locator).await;
            if let Some(thumb) = &thumbnail {
                storage.delete(&thumb.locator).await;
            }
            return Err(internal(e));
        }
    };

    if let Some(tag_ids) = form.tag_ids {
        story_repo::set_story_tags(&pool, story.id, &tag_ids).map_err(internal)?;
    }

    Ok(HttpResponse::Created().json(story))
}

/// POST /admin/stories/{id}
/// Applies a multipart edit. A present file field re-uploads and replaces the
/// stored filename/locator; absent file fields leave them untouched.
pub async fn update_story(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn Storage>,
    story_id: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let story_id = story_id.into_inner();
    let existing = story_repo::find_story_by_id(&pool, story_id).map_err(not_found_or_internal)?;

    let form = read_story_form(payload).await?;

    if let Some(tag_ids) = &form.tag_ids {
        ensure_tags_exist(&pool, tag_ids)?;
    }

    let mut changes = StoryChangeset {
        title: form.title,
        description: form.description,
        author: form.author,
        created_at: form.created_at,
        ..StoryChangeset::default()
    };

    if let Some(file) = form.file_upload {
        let document = store_upload(storage.get_ref(), file, FILE_UPLOAD_FOLDER).await?;
        changes.filename = Some(document.filename);
        changes.path = Some(document.locator);
    }

    if let Some(thumb) = form.thumbnail_upload {
        let thumbnail = store_upload(storage.get_ref(), thumb, THUMBNAIL_UPLOAD_FOLDER).await?;
        changes.thumbnail_filename = Some(thumbnail.filename);
        changes.thumbnail_path = Some(thumbnail.locator);
    }

    let story = if changes.has_changes() {
        story_repo::update_story(&pool, story_id, &changes).map_err(internal)?
    } else {
        existing
    };

    if let Some(tag_ids) = form.tag_ids {
        story_repo::set_story_tags(&pool, story.id, &tag_ids).map_err(internal)?;
    }

    Ok(HttpResponse::Ok().json(story))
}

/// DELETE /admin/stories/{id}
/// Removes the record, then best-effort deletes the backing objects.
pub async fn delete_story(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    storage: web::Data<dyn Storage>,
    story_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let story =
        story_repo::find_story_by_id(&pool, story_id.into_inner()).map_err(not_found_or_internal)?;

    story_repo::delete_story_by_id(&pool, story.id).map_err(internal)?;

    storage.delete(&story.path).await;
    if let Some(thumb_path) = &story.thumbnail_path {
        storage.delete(thumb_path).await;
    }

    Ok(HttpResponse::Ok().json("Story deleted successfully"))
}

// ---------------------------------------------------------------------------
// Tag CRUD
// ---------------------------------------------------------------------------

/// GET /admin/tags
pub async fn list_tags(_admin: AdminUser, pool: web::Data<DbPool>) -> Result<HttpResponse, Error> {
    let tags = tag_repo::load_all_tags(&pool).map_err(internal)?;

    Ok(HttpResponse::Ok().json(tags))
}

/// POST /admin/tags
pub async fn create_tag(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    body: web::Json<TagPayload>,
) -> Result<HttpResponse, Error> {
    let new_tag = NewTag {
        name: body.name.trim().to_string(),
    };

    if new_tag.name.is_empty() {
        return Err(actix_web::error::ErrorBadRequest("Tag name must not be empty"));
    }

    let tag = tag_repo::insert_tag(&pool, &new_tag).map_err(conflict_or_internal)?;

    Ok(HttpResponse::Created().json(tag))
}

/// PUT /admin/tags/{id}
pub async fn update_tag(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    tag_id: web::Path<i32>,
    body: web::Json<TagPayload>,
) -> Result<HttpResponse, Error> {
    let tag_id = tag_id.into_inner();
    tag_repo::find_tag_by_id(&pool, tag_id).map_err(not_found_or_internal)?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(actix_web::error::ErrorBadRequest("Tag name must not be empty"));
    }

    let tag = tag_repo::update_tag_name(&pool, tag_id, name).map_err(conflict_or_internal)?;

    Ok(HttpResponse::Ok().json(tag))
}

/// DELETE /admin/tags/{id}
pub async fn delete_tag(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    tag_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let tag_id = tag_id.into_inner();
    tag_repo::find_tag_by_id(&pool, tag_id).map_err(not_found_or_internal)?;

    tag_repo::delete_tag_by_id(&pool, tag_id).map_err(internal)?;

    Ok(HttpResponse::Ok().json("Tag deleted successfully"))
}

// ---------------------------------------------------------------------------
// User CRUD
// ---------------------------------------------------------------------------

/// GET /admin/users
pub async fn list_users(_admin: AdminUser, pool: web::Data<DbPool>) -> Result<HttpResponse, Error> {
    let users = user_repo::load_all_users(&pool).map_err(internal)?;

    Ok(HttpResponse::Ok().json(users))
}

/// POST /admin/users
pub async fn create_user(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse, Error> {
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return Err(actix_web::error::ErrorBadRequest(
            "Username and password must not be empty",
        ));
    }

    let password_hash = hash_password(&body.password).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Password hashing error: {}", e))
    })?;

    let new_user = NewUser {
        username,
        password_hash,
    };

    let user = user_repo::insert_user(&pool, &new_user).map_err(conflict_or_internal)?;

    Ok(HttpResponse::Created().json(user))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let deleted = user_repo::delete_user_by_id(&pool, user_id.into_inner()).map_err(internal)?;
    if deleted == 0 {
        return Err(actix_web::error::ErrorNotFound("Not found"));
    }

    Ok(HttpResponse::Ok().json("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_parsing_accepts_common_forms() {
        assert!(parse_datetime("2024-03-01T10:30:00").is_some());
        assert!(parse_datetime("2024-03-01T10:30").is_some());
        assert!(parse_datetime("2024-03-01 10:30:00").is_some());

        let midnight = parse_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn datetime_parsing_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("03/01/2024").is_none());
    }

    #[test]
    fn tag_ids_parse_with_whitespace() {
        assert_eq!(parse_tag_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_tag_ids(" 4 ").unwrap(), vec![4]);
        assert_eq!(parse_tag_ids("1,,2").unwrap(), vec![1, 2]);
    }

    #[test]
    fn tag_ids_reject_non_numeric_input() {
        assert!(parse_tag_ids("1,fairy").is_err());
    }
}
