//! In-process stand-ins for the PostgreSQL repositories, used by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::Repositories;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{PostFilter, PostRepository};
use crate::data::relation_repository::RelationRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::tag::Tag;
use crate::domain::user::{Author, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<(Uuid, Uuid)>,
    comments: Vec<Comment>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }
}

pub fn repositories() -> Repositories {
    let store = Arc::new(MemoryStore::default());
    Repositories {
        users: store.clone(),
        posts: store.clone(),
        tags: store.clone(),
        comments: store,
        likes: Arc::new(MemoryRelations::default()),
        follows: Arc::new(MemoryRelations::default()),
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.state().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_authors(&self, ids: &[Uuid]) -> Result<Vec<Author>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(User::author)
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut state = self.state();
        if state.posts.iter().any(|p| p.slug == post.slug) {
            return Err(DomainError::SlugTaken(post.slug));
        }
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, DomainError> {
        let mut state = self.state();
        let slot = state
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| DomainError::PostNotFound(post.id.to_string()))?;
        *slot = post.clone();
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.state().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.state().posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let state = self.state();
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| p.published == filter.published)
            .filter(|p| filter.author_id.is_none_or(|author| p.author_id == author))
            .filter(|p| {
                filter
                    .tag_id
                    .is_none_or(|tag| state.post_tags.contains(&(p.id, tag)))
            })
            .filter(|p| matches_search(filter, p))
            .cloned()
            .collect();

        if filter.published {
            posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        } else {
            posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }

        Ok(posts
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn find_or_create(&self, tag: Tag) -> Result<Tag, DomainError> {
        let mut state = self.state();
        if let Some(existing) = state.tags.iter().find(|t| t.slug == tag.slug) {
            return Ok(existing.clone());
        }
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        Ok(self.state().tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut state = self.state();
        state.post_tags.retain(|(post, _)| *post != post_id);
        state
            .post_tags
            .extend(tag_ids.iter().map(|tag_id| (post_id, *tag_id)));
        Ok(())
    }

    async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<(Uuid, Tag)>, DomainError> {
        let state = self.state();
        let mut rows: Vec<(Uuid, Tag)> = state
            .post_tags
            .iter()
            .filter(|(post, _)| post_ids.contains(post))
            .filter_map(|(post, tag_id)| {
                state
                    .tags
                    .iter()
                    .find(|t| t.id == *tag_id)
                    .map(|t| (*post, t.clone()))
            })
            .collect();
        rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(rows)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        self.state().comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .state()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError> {
        let mut counts = HashMap::new();
        for comment in self.state().comments.iter() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct MemoryRelations {
    rows: Mutex<Vec<(Uuid, Uuid)>>,
}

impl MemoryRelations {
    fn rows(&self) -> MutexGuard<'_, Vec<(Uuid, Uuid)>> {
        self.rows.lock().expect("memory relations poisoned")
    }
}

#[async_trait]
impl RelationRepository for MemoryRelations {
    async fn exists(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError> {
        Ok(self.rows().contains(&(subject, object)))
    }

    async fn insert(&self, subject: Uuid, object: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows();
        if !rows.contains(&(subject, object)) {
            rows.push((subject, object));
        }
        Ok(())
    }

    async fn remove(&self, subject: Uuid, object: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|row| *row != (subject, object));
        Ok(rows.len() != before)
    }

    async fn count_by_object(&self, object: Uuid) -> Result<i64, DomainError> {
        Ok(self.rows().iter().filter(|(_, o)| *o == object).count() as i64)
    }

    async fn count_by_subject(&self, subject: Uuid) -> Result<i64, DomainError> {
        Ok(self.rows().iter().filter(|(s, _)| *s == subject).count() as i64)
    }

    async fn count_by_objects(&self, objects: &[Uuid]) -> Result<HashMap<Uuid, i64>, DomainError> {
        let mut counts = HashMap::new();
        for (_, object) in self.rows().iter() {
            if objects.contains(object) {
                *counts.entry(*object).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

/// Case-insensitive substring test mirroring the SQL `ILIKE` filter.
fn matches_search(filter: &PostFilter, post: &Post) -> bool {
    match &filter.search {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            [&post.title, &post.content, &post.excerpt]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        }
    }
}
