use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use log::{error, info};

mod auth;
mod config;
mod database;
mod handlers;
mod models;
mod repositories;
mod requests;
mod schema;
mod storage;

use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    dotenv::dotenv().ok();

    let config = Config::from_env();
    let pool = database::create_pool(&config.database_url);

    let storage = storage::from_config(&config)
        .await
        .expect("Failed to initialize storage backend");

    if config.remote_storage_enabled() {
        info!("Storage backend: S3 bucket '{}'", config.storage_bucket);
    } else {
        info!("Storage backend: local directory {}", config.upload_dir.display());
    }

    bootstrap_admin_user(&config, &pool);

    let bind_addr = config.bind_addr.clone();
    let config_data = web::Data::new(config);
    let storage_data = web::Data::from(storage);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(storage_data.clone())
            .app_data(config_data.clone())
            .route("/", web::get().to(handlers::site::index))
            .route("/stories/{id}", web::get().to(handlers::site::view_story))
            .route("/uploads/{path:.*}", web::get().to(handlers::files::uploaded_file))
            .route("/processed/{name}", web::get().to(handlers::files::processed_file))
            .route("/download/{name}", web::get().to(handlers::files::download_page))
            .route("/login", web::get().to(handlers::auth::login_form))
            .route("/login", web::post().to(handlers::auth::login))
            .route("/logout", web::get().to(handlers::auth::logout))
            .service(
                web::scope("/admin")
                    .route("", web::get().to(handlers::admin::index))
                    .route("/stories", web::get().to(handlers::admin::list_stories))
                    .route("/stories", web::post().to(handlers::admin::create_story))
                    .route("/stories/{id}", web::get().to(handlers::admin::get_story))
                    .route("/stories/{id}", web::post().to(handlers::admin::update_story))
                    .route("/stories/{id}", web::delete().to(handlers::admin::delete_story))
                    .route("/tags", web::get().to(handlers::admin::list_tags))
                    .route("/tags", web::post().to(handlers::admin::create_tag))
                    .route("/tags/{id}", web::put().to(handlers::admin::update_tag))
                    .route("/tags/{id}", web::delete().to(handlers::admin::delete_tag))
                    .route("/users", web::get().to(handlers::admin::list_users))
                    .route("/users", web::post().to(handlers::admin::create_user))
                    .route("/users/{id}", web::delete().to(handlers::admin::delete_user)),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}

/// Creates the initial admin account from the environment when configured and
/// not already present.
fn bootstrap_admin_user(config: &Config, pool: &database::DbPool) {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return;
    };

    match repositories::users::find_user_by_username(pool, username) {
        Ok(Some(_)) => {}
        Ok(None) => {
            let password_hash = match auth::password::hash_password(password) {
                Ok(hash) => hash,
                Err(e) => {
                    error!("Could not hash bootstrap admin password: {}", e);
                    return;
                }
            };

            let new_user = models::users::NewUser {
                username: username.clone(),
                password_hash,
            };

            match repositories::users::insert_user(pool, &new_user) {
                Ok(user) => info!("Created bootstrap admin user '{}'", user.username),
                Err(e) => error!("Could not create bootstrap admin user: {}", e),
            }
        }
        Err(e) => error!("Could not check for bootstrap admin user: {}", e),
    }
}
