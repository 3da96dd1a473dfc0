use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::generate_histories::{
    GenerateHistoryEntity, InsertGenerateHistoryEntity,
};

#[async_trait]
#[automock]
pub trait GenerateHistoryRepository {
    async fn create(&self, entity: InsertGenerateHistoryEntity) -> Result<Uuid>;

    async fn find_by_id(&self, history_id: Uuid) -> Result<Option<GenerateHistoryEntity>>;

    /// Conditional update on `status IS NULL`; returns false when the row was
    /// already settled. Settlement happens at most once per row.
    async fn settle_success(
        &self,
        history_id: Uuid,
        output: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Same conditional-update discipline as `settle_success`.
    async fn settle_failed(
        &self,
        history_id: Uuid,
        error_message: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<bool>;
}
