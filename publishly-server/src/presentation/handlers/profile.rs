use crate::application::profile_service::ProfileService;
use crate::application::social_service::SocialService;
use crate::domain::error::DomainError;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use tracing::info;
use uuid::Uuid;

pub fn scope() -> Scope {
    web::scope("/profiles")
        .service(get_profile)
        .service(follow_status)
        .service(toggle_follow)
}

#[get("/{id}")]
async fn get_profile(
    profiles: web::Data<ProfileService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let profile = profiles.profile(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/{id}/follow")]
async fn follow_status(
    user: Option<AuthenticatedUser>,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let state = social
        .follow_status(user.map(|u| u.id), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(state))
}

#[post("/{id}/follow")]
async fn toggle_follow(
    req: HttpRequest,
    user: AuthenticatedUser,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let target = path.into_inner();
    let state = social.toggle_follow(user.id, target).await?;

    info!(
        request_id = %request_id(&req),
        follower_id = %user.id,
        following_id = %target,
        following = state.following,
        "follow toggled"
    );

    Ok(HttpResponse::Ok().json(state))
}

#[cfg(test)]
mod tests {
    use crate::presentation::handlers::test_support::{app, session};
    use crate::presentation::utils::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    #[actix_web::test]
    async fn following_updates_the_profile_counts() {
        let app = app().await;
        let (_, ada_id) = session(&app, "ada").await;
        let (bob, _) = session(&app, "bob").await;

        let follow_uri = format!("/api/profiles/{ada_id}/follow");
        let req = test::TestRequest::post()
            .uri(&follow_uri)
            .cookie(Cookie::new(SESSION_COOKIE, bob.clone()))
            .to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["action"], "followed");
        assert_eq!(state["follower_count"], 1);

        let req = test::TestRequest::get()
            .uri(&follow_uri)
            .cookie(Cookie::new(SESSION_COOKIE, bob))
            .to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["following"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/profiles/{ada_id}"))
            .to_request();
        let profile: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(profile["name"], "ada");
        assert_eq!(profile["follower_count"], 1);
        assert_eq!(profile["following_count"], 0);
        assert!(profile.get("email").is_none());
    }

    #[actix_web::test]
    async fn following_yourself_is_rejected() {
        let app = app().await;
        let (ada, ada_id) = session(&app, "ada").await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/profiles/{ada_id}/follow"))
            .cookie(Cookie::new(SESSION_COOKIE, ada))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_profile_is_404() {
        let app = app().await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/profiles/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
