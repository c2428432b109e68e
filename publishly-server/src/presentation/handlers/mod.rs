pub mod auth;
pub mod explore;
pub mod post;
pub mod profile;

use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;

use crate::domain::error::DomainError;
use crate::presentation::dto::HealthResponse;

/// Mounts the whole REST surface under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| DomainError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| DomainError::Validation(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .service(auth::scope())
            .service(post::scope())
            .service(profile::scope())
            .service(explore::search)
            .service(explore::tag_posts),
    );
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{App, Error, test, web};
    use chrono::Duration;
    use serde_json::{Value, json};

    use crate::application::Services;
    use crate::data::memory;
    use crate::infrastructure::security::JwtKeys;
    use crate::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
    use crate::presentation::utils::{SESSION_COOKIE, SessionCookie};

    pub async fn app()
    -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
        let services = Services::new(
            memory::repositories(),
            JwtKeys::new("test-secret".into(), Duration::hours(1)),
        );
        test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(services.auth.clone()))
                .wrap(TimingMiddleware)
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(services.auth.clone()))
                .app_data(web::Data::new(services.posts.clone()))
                .app_data(web::Data::new(services.social.clone()))
                .app_data(web::Data::new(services.profiles.clone()))
                .app_data(web::Data::new(SessionCookie::new(false, Duration::hours(1))))
                .configure(super::configure),
        )
        .await
    }

    /// Signs up and logs in, returning the session token and user id.
    pub async fn session<S>(app: &S, name: &str) -> (String, String)
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = Error>,
    {
        let email = format!("{name}@example.com");
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "name": name, "email": email, "password": "password123" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(app, req).await;
        let user_id = body["user"]["id"].as_str().unwrap_or_default().to_string();

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "password123" }))
            .to_request();
        let resp = test::call_service(app, req).await;
        let token = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .expect("login sets the session cookie");

        (token, user_id)
    }
}
