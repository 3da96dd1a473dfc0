use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::posts::PostEntity;

#[async_trait]
#[automock]
pub trait PostRepository {
    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<PostEntity>>;

    /// Active posts in `scheduled` whose `scheduled_at` has passed, ordered
    /// by `(scheduled_at ASC, id ASC)` for a deterministic sweep.
    async fn list_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<PostEntity>>;

    /// Posts left in `processing` by an earlier sweep (retries pending or a
    /// crashed sweep), same ordering as `list_due_scheduled`.
    async fn list_processing(&self) -> Result<Vec<PostEntity>>;

    /// CAS `scheduled -> processing`; false when the post was concurrently
    /// moved (cancelled or picked up by another sweep).
    async fn begin_processing(&self, post_id: Uuid) -> Result<bool>;

    /// CAS `processing -> published`, stamping `published_at`.
    async fn mark_published(&self, post_id: Uuid, published_at: DateTime<Utc>) -> Result<bool>;

    /// CAS `draft -> scheduled` with the requested `scheduled_at`.
    async fn schedule(&self, post_id: Uuid, scheduled_at: DateTime<Utc>) -> Result<bool>;

    /// CAS `scheduled -> draft`, clearing `scheduled_at`.
    async fn revert_to_draft(&self, post_id: Uuid) -> Result<bool>;
}
