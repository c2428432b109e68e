use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::slug::slugify;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        let slug = slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
        }
    }
}

/// Trims, lowercases and de-duplicates editor tag input, keeping first-seen order.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        let name = name.trim().to_lowercase();
        if name.is_empty() || slugify(&name).is_empty() {
            continue;
        }
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
