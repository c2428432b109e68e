mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use chrono::Duration;
use tracing::info;

use application::Services;
use data::Repositories;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::handlers;
use presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use presentation::utils::SessionCookie;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let keys = JwtKeys::new(
        config.jwt_secret.clone(),
        Duration::hours(config.session_ttl_hours),
    );
    let services = Services::new(Repositories::postgres(pool), keys);
    let cookies = SessionCookie::new(config.cookie_secure, services.auth.keys().ttl());

    info!(host = %config.host, port = config.port, "starting publishly server");

    let config_data = config.clone();
    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        // wrap order: last registered runs first
        App::new()
            .wrap(JwtAuthMiddleware::new(services.auth.clone()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(services.auth.clone()))
            .app_data(web::Data::new(services.posts.clone()))
            .app_data(web::Data::new(services.social.clone()))
            .app_data(web::Data::new(services.profiles.clone()))
            .app_data(web::Data::new(cookies.clone()))
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

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
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }

    cors
}
