use crate::database::DbPool;
use crate::models::stories::Story;
use crate::repositories::stories::{find_story_by_id, load_all_stories, load_tags_for_story};
use crate::storage::Storage;
use actix_web::{Error, HttpResponse, web};
use chrono::NaiveDateTime;
use serde::Serialize;

/// A story as shown on the public site, with storage locators resolved to
/// servable URLs.
#[derive(Serialize)]
pub struct StoryView {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub uploaded_at: NaiveDateTime,
    pub tags: Vec<String>,
    pub pdf_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl StoryView {
    fn from_story(story: Story, tags: Vec<String>, storage: &dyn Storage) -> Self {
        let pdf_url = storage.resolve_url(&story.path);
        let thumbnail_url = story
            .thumbnail_path
            .as_deref()
            .map(|locator| storage.resolve_url(locator));

        Self {
            id: story.id,
            title: story.title,
            description: story.description,
            author: story.author,
            created_at: story.created_at,
            uploaded_at: story.uploaded_at,
            tags,
            pdf_url,
            thumbnail_url,
        }
    }
}

/// GET /
/// Lists all stories with resolved thumbnail/document URLs.
pub async fn index(
    pool: web::Data<DbPool>,
    storage: web::Data<dyn Storage>,
) -> Result<HttpResponse, Error> {
    let stories = load_all_stories(&pool)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("DB error: {}", e)))?;

    let mut views = Vec::with_capacity(stories.len());
    for story in stories {
        let tags = load_tags_for_story(&pool, story.id)
            .map_err(|e| actix_web::error::ErrorInternalServerError(format!("DB error: {}", e)))?
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        views.push(StoryView::from_story(story, tags, storage.get_ref()));
    }

    Ok(HttpResponse::Ok().json(views))
}

/// GET /stories/{id}
/// Detail view; 404 if the identifier is unknown.
pub async fn view_story(
    pool: web::Data<DbPool>,
    storage: web::Data<dyn Storage>,
    story_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let story = find_story_by_id(&pool, story_id.into_inner()).map_err(|e| match e {
        diesel::result::Error::NotFound => actix_web::error::ErrorNotFound("Story not found"),
        _ => actix_web::error::ErrorInternalServerError(format!("Database error: {}", e)),
    })?;

    let tags = load_tags_for_story(&pool, story.id)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("DB error: {}", e)))?
        .into_iter()
        .map(|tag| tag.name)
        .collect();

    Ok(HttpResponse::Ok().json(StoryView::from_story(story, tags, storage.get_ref())))
}
