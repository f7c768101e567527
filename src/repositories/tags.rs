use crate::database::{DbPool, get_db_conn};
use crate::models::tags::{NewTag, Tag};
use crate::schema::story_tags;
use crate::schema::tags::dsl::*;
use diesel::prelude::*;

/// Inserts a new tag and returns the created record
pub fn insert_tag(pool: &DbPool, new: &NewTag) -> Result<Tag, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::insert_into(tags).values(new).get_result(&mut conn)
}

/// Loads all tags from the database
pub fn load_all_tags(pool: &DbPool) -> Result<Vec<Tag>, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    tags.load::<Tag>(&mut conn)
}

/// Finds a tag by its ID.
pub fn find_tag_by_id(pool: &DbPool, tag_id_val: i32) -> Result<Tag, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    tags.filter(id.eq(tag_id_val)).first::<Tag>(&mut conn)
}

/// Renames a tag and returns the updated record.
pub fn update_tag_name(
    pool: &DbPool,
    tag_id_val: i32,
    new_name: &str,
) -> Result<Tag, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::update(tags.filter(id.eq(tag_id_val)))
        .set(name.eq(new_name))
        .get_result(&mut conn)
}

/// Deletes a tag and its story associations in one transaction.
pub fn delete_tag_by_id(pool: &DbPool, tag_id_val: i32) -> Result<usize, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    conn.transaction(|conn| {
        diesel::delete(story_tags::table.filter(story_tags::tag_id.eq(tag_id_val)))
            .execute(conn)?;
        diesel::delete(tags.filter(id.eq(tag_id_val))).execute(conn)
    })
}

pub fn count_tags(pool: &DbPool) -> Result<i64, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    tags.count().get_result(&mut conn)
}
