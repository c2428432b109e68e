use serde::Serialize;
use uuid::Uuid;

use crate::data::relation_repository::RelationRepository;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggled {
    Added,
    Removed,
}

/// Flips the existence of the `(subject, object)` row: removes it when
/// present, inserts it when absent. Two concurrent toggles are not
/// coordinated; the store's unique key keeps at most one row.
pub async fn toggle(
    repo: &dyn RelationRepository,
    subject: Uuid,
    object: Uuid,
) -> Result<Toggled, DomainError> {
    if repo.exists(subject, object).await? {
        repo.remove(subject, object).await?;
        Ok(Toggled::Removed)
    } else {
        repo.insert(subject, object).await?;
        Ok(Toggled::Added)
    }
}
