pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::identity::IdentityService;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::data::file_store::LocalFileStore;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::principal_repository::{PostgresPrincipalRepository, PrincipalRepository};
use crate::data::profile_repository::PostgresProfileRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::mailer::LogMailer;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};

pub type AppAuthService = AuthService<PostgresPrincipalRepository>;
pub type AppIdentityService = IdentityService<PostgresProfileRepository>;
pub type AppProfileService =
    ProfileService<PostgresProfileRepository, PostgresPostRepository, LocalFileStore>;
pub type AppPostService = PostService<PostgresPostRepository>;

pub async fn serve(config: AppConfig, pool: PgPool) -> anyhow::Result<()> {
    let principal_repo = Arc::new(PostgresPrincipalRepository::new(pool.clone()));
    let profile_repo = Arc::new(PostgresProfileRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let file_store = Arc::new(LocalFileStore::new(
        config.storage_root.clone(),
        config.public_base_url.clone(),
    ));

    let auth_service = AuthService::new(
        Arc::clone(&principal_repo),
        JwtKeys::new(config.jwt_secret.clone()),
        Arc::new(LogMailer),
    );
    let identity_service = IdentityService::new(Arc::clone(&profile_repo));
    let profile_service = ProfileService::new(
        Arc::clone(&profile_repo),
        Arc::clone(&post_repo),
        Arc::clone(&file_store),
    );
    let post_service = PostService::new(Arc::clone(&post_repo));

    let keys = auth_service.keys().clone();
    let principal_lookup: Arc<dyn PrincipalRepository> = principal_repo.clone();

    let bind_address = (config.host.clone(), config.port);
    let config_data = config;

    tracing::info!(
        "HTTP server starting on http://{}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        let cors = build_cors(&config_data);

        App::new()
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .wrap(TimingMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::PayloadConfig::new(4 * 1024 * 1024))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(identity_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::from(Arc::clone(&file_store)))
            .service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware::new(
                        keys.clone(),
                        Arc::clone(&principal_lookup),
                    ))
                    .route("/health", web::get().to(health))
                    .service(handlers::auth::scope())
                    .service(handlers::profile::me)
                    .service(handlers::profile::create_profile)
                    .service(handlers::profile::update_profile)
                    .service(handlers::profile::upload_avatar)
                    .service(handlers::profile::remove_avatar)
                    .service(handlers::users::list_users)
                    .service(handlers::users::get_user)
                    .service(handlers::post::list_posts)
                    .service(handlers::post::neighbors)
                    .service(handlers::post::get_post)
                    .service(handlers::post::create_post)
                    .service(handlers::post::update_post)
                    .service(handlers::post::delete_post),
            )
            .service(handlers::files::serve_file)
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
