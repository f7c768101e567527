use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TagPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub password: String,
}
