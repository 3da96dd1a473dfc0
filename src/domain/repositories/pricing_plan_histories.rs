use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::pricing_plan_histories::{
    InsertPricingPlanHistoryEntity, PricingPlanHistoryEntity,
};

#[async_trait]
#[automock]
pub trait PricingPlanHistoryRepository {
    async fn create(&self, entity: InsertPricingPlanHistoryEntity) -> Result<Uuid>;

    /// The user's current subscription: the at-most-one row with
    /// `end_date IS NULL AND status = SUCCESS`.
    async fn find_current(&self, user_id: Uuid) -> Result<Option<PricingPlanHistoryEntity>>;

    /// Closes a history when a successor cycle begins or the user cancels.
    async fn close(&self, history_id: Uuid, end_date: DateTime<Utc>) -> Result<()>;

    /// Closes a history as EXPIRED after a renewal could not be charged.
    async fn mark_expired(&self, history_id: Uuid, end_date: DateTime<Utc>) -> Result<()>;

    /// Current histories whose `expire_at` has passed, due for the renewal
    /// sweep.
    async fn list_renewal_due(&self, now: DateTime<Utc>)
    -> Result<Vec<PricingPlanHistoryEntity>>;
}
