use crate::database::{DbPool, get_db_conn};
use crate::models::stories::{NewStory, Story, StoryChangeset};
use crate::models::tags::{StoryTag, Tag};
use crate::schema::stories::dsl::*;
use crate::schema::{story_tags, tags};
use diesel::prelude::*;

/// Inserts a new story record and returns the created record
pub fn insert_story(pool: &DbPool, new: &NewStory) -> Result<Story, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::insert_into(stories).values(new).get_result(&mut conn)
}

/// Loads all story records from the database
pub fn load_all_stories(pool: &DbPool) -> Result<Vec<Story>, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    stories.load::<Story>(&mut conn)
}

/// Finds a story record by its ID.
pub fn find_story_by_id(pool: &DbPool, story_id_val: i32) -> Result<Story, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    stories.filter(id.eq(story_id_val)).first::<Story>(&mut conn)
}

/// Applies an admin edit and returns the updated record.
pub fn update_story(
    pool: &DbPool,
    story_id_val: i32,
    changes: &StoryChangeset,
) -> Result<Story, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::update(stories.filter(id.eq(story_id_val)))
        .set(changes)
        .get_result(&mut conn)
}

/// Deletes a story and its tag associations in one transaction.
pub fn delete_story_by_id(pool: &DbPool, story_id_val: i32) -> Result<usize, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    conn.transaction(|conn| {
        diesel::delete(story_tags::table.filter(story_tags::story_id.eq(story_id_val)))
            .execute(conn)?;
        diesel::delete(stories.filter(id.eq(story_id_val))).execute(conn)
    })
}

/// Loads the tags associated with one story.
pub fn load_tags_for_story(
    pool: &DbPool,
    story_id_val: i32,
) -> Result<Vec<Tag>, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    story_tags::table
        .inner_join(tags::table)
        .filter(story_tags::story_id.eq(story_id_val))
        .select((tags::id, tags::name))
        .load::<Tag>(&mut conn)
}

/// Replaces a story's tag associations wholesale.
pub fn set_story_tags(
    pool: &DbPool,
    story_id_val: i32,
    tag_ids: &[i32],
) -> Result<(), diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    conn.transaction(|conn| {
        diesel::delete(story_tags::table.filter(story_tags::story_id.eq(story_id_val)))
            .execute(conn)?;

        let rows: Vec<StoryTag> = tag_ids
            .iter()
            .map(|&tid| StoryTag {
                story_id: story_id_val,
                tag_id: tid,
            })
            .collect();

        if !rows.is_empty() {
            diesel::insert_into(story_tags::table)
                .values(&rows)
                .execute(conn)?;
        }

        Ok(())
    })
}

pub fn count_stories(pool: &DbPool) -> Result<i64, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    stories.count().get_result(&mut conn)
}
