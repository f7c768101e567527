use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable};
use serde::Serialize;

/// A catalog entry for one uploaded story document. `filename`/`path` always
/// point at the primary document; the thumbnail fields are set only when a
/// thumbnail was uploaded.
#[derive(Debug, Queryable, Serialize)]
pub struct Story {
    pub id: i32,
    pub filename: String,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub thumbnail_filename: Option<String>,
    pub thumbnail_path: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::stories)]
pub struct NewStory {
    pub filename: String,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub thumbnail_filename: Option<String>,
    pub thumbnail_path: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub uploaded_at: NaiveDateTime,
}

/// Field subset applied on admin edits. `None` fields are left untouched;
/// `uploaded_at` is never part of an edit.
#[derive(Default, AsChangeset)]
#[diesel(table_name = crate::schema::stories)]
pub struct StoryChangeset {
    pub filename: Option<String>,
    pub path: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub thumbnail_filename: Option<String>,
    pub thumbnail_path: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl StoryChangeset {
    pub fn has_changes(&self) -> bool {
        self.filename.is_some()
            || self.path.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.author.is_some()
            || self.thumbnail_filename.is_some()
            || self.thumbnail_path.is_some()
            || self.created_at.is_some()
    }
}
