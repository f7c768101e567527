use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;

pub const AUTH_COOKIE: &str = "auth_token";

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a session token for the given user id.
pub fn create_jwt(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Builds the HTTP-only session cookie carrying a freshly signed token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .http_only(true)
        .secure(false) // TLS termination happens upstream
        .path("/")
        .same_site(SameSite::Lax)
        .finish()
}

/// Expired replacement cookie used by logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(AUTH_COOKIE, "")
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

/// Session principal required by every admin handler. Extraction failure
/// redirects to the login page instead of surfacing a bare 401.
#[derive(Debug)]
pub struct AdminUser {
    pub user_id: i32,
}

#[derive(Debug)]
pub struct LoginRedirect;

impl std::fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "authentication required")
    }
}

impl ResponseError for LoginRedirect {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .append_header((header::LOCATION, "/login"))
            .finish()
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let secret = req
            .app_data::<web::Data<Config>>()
            .map(|config| config.secret_key.clone());

        let user_id = secret
            .and_then(|secret| {
                req.cookie(AUTH_COOKIE)
                    .and_then(|cookie| validate_jwt(cookie.value(), &secret).ok())
            })
            .and_then(|claims| claims.sub.parse::<i32>().ok());

        ready(match user_id {
            Some(user_id) => Ok(AdminUser { user_id }),
            None => Err(LoginRedirect.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            bind_addr: String::new(),
            aws_access_key: None,
            storage_bucket: "pdf-stories".to_string(),
            upload_dir: PathBuf::from("uploads"),
            secret_key: "test-secret".to_string(),
            admin_username: None,
            admin_password: None,
        }
    }

    #[::core::prelude::v1::test]
    fn jwt_round_trip() {
        let token = create_jwt("42", "test-secret").unwrap();
        let claims = validate_jwt(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > claims.iat);
    }

    #[::core::prelude::v1::test]
    fn jwt_rejects_wrong_secret_and_garbage() {
        let token = create_jwt("42", "test-secret").unwrap();
        assert!(validate_jwt(&token, "other-secret").is_err());
        assert!(validate_jwt("not-a-token", "test-secret").is_err());
    }

    async fn guarded(admin: AdminUser) -> HttpResponse {
        HttpResponse::Ok().body(admin.user_id.to_string())
    }

    #[actix_web::test]
    async fn missing_session_redirects_to_login() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .route("/admin", web::get().to(guarded)),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_web::test]
    async fn valid_session_cookie_grants_access() {
        let config = test_config();
        let token = create_jwt("7", &config.secret_key).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .route("/admin", web::get().to(guarded)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .cookie(Cookie::new(AUTH_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn tampered_cookie_redirects_to_login() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .route("/admin", web::get().to(guarded)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .cookie(Cookie::new(AUTH_COOKIE, "forged"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
    }
}
