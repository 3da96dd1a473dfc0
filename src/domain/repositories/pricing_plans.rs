use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::pricing_plans::PricingPlanEntity;

#[async_trait]
#[automock]
pub trait PricingPlanRepository {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PricingPlanEntity>>;

    async fn list_active(&self) -> Result<Vec<PricingPlanEntity>>;

    /// Users plus histories still pointing at the plan. Deletion is blocked
    /// while this is non-zero.
    async fn count_references(&self, plan_id: Uuid) -> Result<i64>;

    async fn delete(&self, plan_id: Uuid) -> Result<()>;
}
