use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{SearchQuery, SearchResponse, TagPostsResponse};
use actix_web::{HttpResponse, get, web};

#[get("/search")]
async fn search(
    posts: web::Data<PostService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, DomainError> {
    let query = query.into_inner().q;
    let results = posts.search(&query).await?;
    Ok(HttpResponse::Ok().json(SearchResponse {
        query,
        posts: results,
    }))
}

#[get("/tags/{slug}")]
async fn tag_posts(
    posts: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let (tag, posts) = posts.posts_by_tag(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TagPostsResponse { tag, posts }))
}
