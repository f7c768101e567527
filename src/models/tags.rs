use diesel::{Insertable, Queryable};
use serde::Serialize;

#[derive(Debug, Queryable, Serialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    pub name: String,
}

/// Join row linking a story to a tag.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::story_tags)]
pub struct StoryTag {
    pub story_id: i32,
    pub tag_id: i32,
}
