use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::tag::Tag;
use crate::domain::user::Author;

const EXCERPT_CHARS: usize = 140;
const WORDS_PER_MINUTE: f64 = 200.0;
const MIN_READ_TIME: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub author_id: Uuid,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, slug: String, draft: &PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug,
            title: draft.title.clone(),
            content: draft.content.clone(),
            excerpt: draft.excerpt(),
            cover_image: draft.cover_image(),
            author_id,
            published: draft.publish,
            published_at: draft.publish.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the editable fields with a fresh save from the editor.
    pub fn apply(&mut self, draft: &PostDraft) {
        let now = Utc::now();
        self.title = draft.title.clone();
        self.content = draft.content.clone();
        self.excerpt = draft.excerpt();
        self.cover_image = draft.cover_image();
        self.published = draft.publish;
        self.published_at = draft.publish.then_some(now);
        self.updated_at = now;
    }
}

/// What the editor submits on "Save Draft" or "Publish".
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish: bool,
}

impl PostDraft {
    fn excerpt(&self) -> String {
        match self.excerpt.as_deref().map(str::trim) {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
            _ => generate_excerpt(&self.content),
        }
    }

    fn cover_image(&self) -> Option<String> {
        self.cover_image
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

/// A post joined with everything a feed card or post page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<Author>,
    pub tags: Vec<Tag>,
    pub like_count: i64,
    pub comment_count: i64,
    pub read_time: u32,
}

pub fn generate_excerpt(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= EXCERPT_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head.trim_end())
}

/// Estimated minutes to read, never below three.
pub fn read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count() as f64;
    ((words / WORDS_PER_MINUTE).round() as u32).max(MIN_READ_TIME)
}
