use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    AuthResponse, LoginRequest, MeResponse, SessionUser, SignupRequest, UserSummary,
};
use crate::presentation::utils::{AuthenticatedUser, SessionCookie, request_id};
use actix_web::{HttpRequest, HttpResponse, Responder, Scope, get, post, web};
use serde_json::json;
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(signup)
        .service(login)
        .service(me)
        .service(logout)
}

#[post("/signup")]
async fn signup(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, DomainError> {
    let user = service
        .signup(&payload.name, &payload.email, &payload.password)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        email = %user.email,
        "user registered"
    );

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User created successfully",
        user: UserSummary::from(&user),
    }))
}

#[post("/login")]
async fn login(
    req: HttpRequest,
    service: web::Data<AuthService>,
    cookies: web::Data<SessionCookie>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let (user, token) = service.login(&payload.email, &payload.password).await?;

    info!(request_id = %request_id(&req), user_id = %user.id, "user logged in");

    Ok(HttpResponse::Ok()
        .cookie(cookies.issue(token))
        .json(AuthResponse {
            message: "Login successful",
            user: UserSummary::from(&user),
        }))
}

/// Never fails: an anonymous or stale session reports `{"user": null}`.
#[get("/me")]
async fn me(user: Option<AuthenticatedUser>) -> impl Responder {
    HttpResponse::Ok().json(MeResponse {
        user: user.map(SessionUser::from),
    })
}

#[post("/logout")]
async fn logout(cookies: web::Data<SessionCookie>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(cookies.clear())
        .json(json!({ "message": "Logged out" }))
}

#[cfg(test)]
mod tests {
    use crate::presentation::handlers::test_support::{app, session};
    use crate::presentation::utils::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn signup_returns_201_with_the_public_user() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "name": "Ada", "email": "Ada@Example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert!(body["user"].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn signup_with_registered_email_returns_409() {
        let app = app().await;
        session(&app, "ada").await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "name": "Imposter", "email": "ada@example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn signup_with_missing_field_returns_400() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "email": "ada@example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "missing required fields");
    }

    #[actix_web::test]
    async fn malformed_json_returns_400() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn wrong_password_returns_401() {
        let app = app().await;
        session(&app, "ada").await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.response().cookies().next().is_none());
    }

    #[actix_web::test]
    async fn login_cookie_identifies_the_user_on_me() {
        let app = app().await;
        let (token, user_id) = session(&app, "ada").await;

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["id"], user_id.as_str());
        assert_eq!(body["user"]["name"], "ada");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["id"], user_id.as_str());
    }

    #[actix_web::test]
    async fn me_without_a_valid_session_is_null_not_an_error() {
        let app = app().await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["user"].is_null());

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["user"].is_null());
    }

    #[actix_web::test]
    async fn stale_cookie_falls_back_to_bearer_header() {
        let app = app().await;
        let (token, user_id) = session(&app, "ada").await;

        let req = test::TestRequest::get()
            .uri("/api/posts/drafts")
            .cookie(Cookie::new(SESSION_COOKIE, "stale"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["id"], user_id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/posts/drafts")
            .cookie(Cookie::new(SESSION_COOKIE, "stale"))
            .insert_header(("Authorization", "Bearer also-stale"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn logout_expires_the_cookie() {
        let app = app().await;
        let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("removal cookie");
        assert_eq!(cookie.value(), "");
    }

    #[actix_web::test]
    async fn responses_carry_request_id_and_timing_headers() {
        let app = app().await;
        let req = test::TestRequest::get()
            .uri("/api/health")
            .insert_header(("x-request-id", "abc-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
        assert!(resp.headers().contains_key("server-timing"));
    }
}
