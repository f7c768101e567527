use crate::database::{DbPool, get_db_conn};
use crate::models::users::{NewUser, User};
use crate::schema::users::dsl::*;
use diesel::prelude::*;

/// Inserts a new user and returns the created user
pub fn insert_user(pool: &DbPool, new_user: &NewUser) -> Result<User, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::insert_into(users)
        .values(new_user)
        .get_result(&mut conn)
}

/// Finds a user by username.
pub fn find_user_by_username(
    pool: &DbPool,
    username_val: &str,
) -> Result<Option<User>, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    let user_opt = users
        .filter(username.eq(username_val))
        .first::<User>(&mut conn)
        .optional()?;

    Ok(user_opt)
}

/// Loads all users from the database
pub fn load_all_users(pool: &DbPool) -> Result<Vec<User>, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    users.load::<User>(&mut conn)
}

/// Deletes a user record by its ID.
pub fn delete_user_by_id(pool: &DbPool, user_id_val: i32) -> Result<usize, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    diesel::delete(users.filter(id.eq(user_id_val))).execute(&mut conn)
}

pub fn count_users(pool: &DbPool) -> Result<i64, diesel::result::Error> {
    let mut conn = get_db_conn(pool)?;

    users.count().get_result(&mut conn)
}
