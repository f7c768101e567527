pub mod stories;
pub mod tags;
pub mod users;
