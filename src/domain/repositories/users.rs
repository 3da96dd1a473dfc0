use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::UserEntity;
use crate::domain::value_objects::quotas::QuotaDimension;

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    /// Atomically debits `amount` from the dimension's remaining balance.
    /// Must be a single conditional update (`used + amount <= limit` checked
    /// inside the statement); returns false when the balance is insufficient.
    async fn try_reserve_quota(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        amount: i32,
    ) -> Result<bool>;

    /// Atomically credits `amount` back, guarded against driving the used
    /// counter below zero. Returns false when the guard refused the update.
    async fn release_quota(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        amount: i32,
    ) -> Result<bool>;

    /// New-cycle rollover: replaces both limits, zeroes both used counters
    /// and stamps `last_reset_date`.
    async fn reset_quota_cycle(
        &self,
        user_id: Uuid,
        credit: i32,
        capacity: i32,
        reset_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn set_pricing_plan(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<()>;
}
