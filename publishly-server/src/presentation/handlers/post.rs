use crate::application::post_service::PostService;
use crate::application::social_service::SocialService;
use crate::data::post_repository::PostFilter;
use crate::domain::error::DomainError;
use crate::domain::post::PostDraft;
use crate::presentation::dto::{CommentRequest, ListPostsQuery, ListPostsResponse, PostsResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

pub fn scope() -> Scope {
    web::scope("/posts")
        .service(list_posts)
        .service(save_post)
        .service(list_drafts)
        .service(like_status)
        .service(toggle_like)
        .service(list_comments)
        .service(add_comment)
        // catch-all slug route goes last
        .service(get_post)
}

#[get("")]
async fn list_posts(
    posts: web::Data<PostService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = PostFilter::published().page(query.limit, query.offset);
    let items = posts.feed(Some(page.limit), Some(page.offset)).await?;

    Ok(HttpResponse::Ok().json(ListPostsResponse {
        posts: items,
        limit: page.limit,
        offset: page.offset,
    }))
}

#[post("")]
async fn save_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    payload: web::Json<PostDraft>,
) -> Result<HttpResponse, DomainError> {
    let saved = posts.save_post(user.id, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %saved.post.post.id,
        created = saved.created,
        "post saved"
    );

    let response = if saved.created {
        HttpResponse::Created().json(saved.post)
    } else {
        HttpResponse::Ok().json(saved.post)
    };
    Ok(response)
}

#[get("/drafts")]
async fn list_drafts(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
) -> Result<HttpResponse, DomainError> {
    let drafts = posts.drafts(user.id).await?;
    Ok(HttpResponse::Ok().json(PostsResponse { posts: drafts }))
}

#[get("/{id}/like")]
async fn like_status(
    user: Option<AuthenticatedUser>,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let state = social
        .like_status(user.map(|u| u.id), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(state))
}

#[post("/{id}/like")]
async fn toggle_like(
    req: HttpRequest,
    user: AuthenticatedUser,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let state = social.toggle_like(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        liked = state.liked,
        "like toggled"
    );

    Ok(HttpResponse::Ok().json(state))
}

#[get("/{id}/comments")]
async fn list_comments(
    user: Option<AuthenticatedUser>,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comments = social
        .list_comments(user.map(|u| u.id), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "comments": comments })))
}

#[post("/{id}/comments")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    social: web::Data<SocialService>,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = social.add_comment(user.id, post_id, &payload.content).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        comment_id = %comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}

#[get("/{slug}")]
async fn get_post(
    user: Option<AuthenticatedUser>,
    posts: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let post = posts
        .get_post(&path.into_inner(), user.map(|u| u.id))
        .await?;
    Ok(HttpResponse::Ok().json(post))
}
