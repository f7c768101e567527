use crate::auth::jwt::{clear_session_cookie, create_jwt, session_cookie};
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::database::DbPool;
use crate::repositories::users::find_user_by_username;
use crate::requests::auth::LoginForm;
use actix_web::http::header;
use actix_web::{Error, HttpResponse, web};
use log::{info, warn};

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Log in</title></head>
<body>
<form method="post" action="/login">
  <label>Username <input type="text" name="username"></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#;

/// GET /login
pub async fn login_form() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(LOGIN_PAGE)
}

/// POST /login
/// Verifies the credentials and establishes the session cookie.
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, Error> {
    let user = find_user_by_username(&pool, &form.username)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    // One message for unknown user and wrong password alike.
    let Some(user) = user.filter(|u| verify_password(&form.password, &u.password_hash)) else {
        warn!("Failed login attempt for '{}'", form.username);
        return Ok(HttpResponse::Unauthorized().body("Invalid username or password"));
    };

    let token = create_jwt(&user.id.to_string(), &config.secret_key).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Session token error: {}", e))
    })?;

    info!("User '{}' logged in", user.username);

    Ok(HttpResponse::Found()
        .append_header((header::LOCATION, "/admin"))
        .cookie(session_cookie(token))
        .finish())
}

/// GET /logout
/// Clears the session cookie and redirects to the login page.
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, "/login"))
        .cookie(clear_session_cookie())
        .finish()
}
