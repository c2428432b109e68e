use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::Repositories;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{MAX_PAGE_SIZE, PostFilter, PostRepository};
use crate::data::relation_repository::RelationRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetails, PostDraft, read_time};
use crate::domain::slug::slugify;
use crate::domain::tag::{Tag, normalize_tag_names};
use crate::domain::user::Author;

const SEARCH_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
    likes: Arc<dyn RelationRepository>,
    comments: Arc<dyn CommentRepository>,
}

#[derive(Debug)]
pub struct SavedPost {
    pub post: PostDetails,
    pub created: bool,
}

impl PostService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            posts: repos.posts.clone(),
            tags: repos.tags.clone(),
            users: repos.users.clone(),
            likes: repos.likes.clone(),
            comments: repos.comments.clone(),
        }
    }

    /// Saves the editor state. The slug derived from the title decides
    /// between updating the author's existing post and inserting a new one;
    /// the post's tags are replaced wholesale.
    #[instrument(skip(self, draft), fields(title = %draft.title, publish = draft.publish))]
    pub async fn save_post(
        &self,
        author_id: Uuid,
        mut draft: PostDraft,
    ) -> Result<SavedPost, DomainError> {
        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() || draft.content.trim().is_empty() {
            return Err(DomainError::Validation(
                "title and content are required".into(),
            ));
        }

        let slug = slugify(&draft.title);
        if slug.is_empty() {
            return Err(DomainError::Validation(
                "title must contain at least one letter or digit".into(),
            ));
        }

        let (post, created) = match self.posts.find_by_slug(&slug).await? {
            Some(mut existing) => {
                if existing.author_id != author_id {
                    return Err(DomainError::SlugTaken(slug));
                }
                existing.apply(&draft);
                (self.posts.update(existing).await?, false)
            }
            None => {
                let post = Post::new(author_id, slug, &draft);
                (self.posts.create(post).await?, true)
            }
        };

        let mut tag_ids = Vec::new();
        for name in normalize_tag_names(&draft.tags) {
            let tag = self.tags.find_or_create(Tag::new(name)).await?;
            if !tag_ids.contains(&tag.id) {
                tag_ids.push(tag.id);
            }
        }
        self.tags.replace_post_tags(post.id, &tag_ids).await?;

        info!(
            post_id = %post.id,
            slug = %post.slug,
            created,
            published = post.published,
            tags = tag_ids.len(),
            "post saved"
        );

        let post = self.hydrate_one(post).await?;
        Ok(SavedPost { post, created })
    }

    /// A post by slug. Drafts resolve only for their author.
    pub async fn get_post(
        &self,
        slug: &str,
        viewer: Option<Uuid>,
    ) -> Result<PostDetails, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .filter(|post| post.published || viewer == Some(post.author_id))
            .ok_or_else(|| DomainError::PostNotFound(slug.to_string()))?;

        self.hydrate_one(post).await
    }

    pub async fn feed(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<PostDetails>, DomainError> {
        let filter = PostFilter::published().page(limit, offset);
        self.list(&filter).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<PostDetails>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let filter = PostFilter {
            search: Some(query.to_string()),
            limit: SEARCH_LIMIT,
            ..PostFilter::published()
        };
        self.list(&filter).await
    }

    pub async fn posts_by_tag(&self, slug: &str) -> Result<(Tag, Vec<PostDetails>), DomainError> {
        let tag = self
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::TagNotFound(slug.to_string()))?;

        let filter = PostFilter {
            tag_id: Some(tag.id),
            limit: MAX_PAGE_SIZE,
            ..PostFilter::published()
        };
        let posts = self.list(&filter).await?;
        Ok((tag, posts))
    }

    pub async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<PostDetails>, DomainError> {
        let filter = PostFilter {
            author_id: Some(author_id),
            limit: MAX_PAGE_SIZE,
            ..PostFilter::published()
        };
        self.list(&filter).await
    }

    pub async fn drafts(&self, author_id: Uuid) -> Result<Vec<PostDetails>, DomainError> {
        self.list(&PostFilter::drafts_of(author_id)).await
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostDetails>, DomainError> {
        let posts = self.posts.list(filter).await?;
        self.hydrate(posts).await
    }

    async fn hydrate_one(&self, post: Post) -> Result<PostDetails, DomainError> {
        let id = post.id;
        self.hydrate(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))
    }

    /// Attaches authors, tags and counters with one batched lookup each.
    async fn hydrate(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<Uuid, Author> = self
            .users
            .find_authors(&author_ids)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (post_id, tag) in self.tags.tags_for_posts(&ids).await? {
            tags.entry(post_id).or_default().push(tag);
        }

        let likes = self.likes.count_by_objects(&ids).await?;
        let comments = self.comments.count_for_posts(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostDetails {
                author: authors.get(&post.author_id).cloned(),
                tags: tags.remove(&post.id).unwrap_or_default(),
                like_count: likes.get(&post.id).copied().unwrap_or(0),
                comment_count: comments.get(&post.id).copied().unwrap_or(0),
                read_time: read_time(&post.content),
                post,
            })
            .collect())
    }
}
