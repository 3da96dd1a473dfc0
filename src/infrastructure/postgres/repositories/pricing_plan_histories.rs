use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::pricing_plan_histories::{
    InsertPricingPlanHistoryEntity, PricingPlanHistoryEntity,
};
use crate::domain::repositories::pricing_plan_histories::PricingPlanHistoryRepository;
use crate::domain::value_objects::enums::pricing_history_statuses::PricingHistoryStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, schema::pricing_plan_histories,
};

pub struct PricingPlanHistoryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PricingPlanHistoryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PricingPlanHistoryRepository for PricingPlanHistoryPostgres {
    async fn create(&self, entity: InsertPricingPlanHistoryEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let history_id = insert_into(pricing_plan_histories::table)
            .values(&entity)
            .returning(pricing_plan_histories::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(history_id)
    }

    async fn find_current(&self, user_id: Uuid) -> Result<Option<PricingPlanHistoryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let current = pricing_plan_histories::table
            .filter(pricing_plan_histories::user_id.eq(user_id))
            .filter(pricing_plan_histories::end_date.is_null())
            .filter(pricing_plan_histories::status.eq(PricingHistoryStatus::Success.to_string()))
            .select(PricingPlanHistoryEntity::as_select())
            .first::<PricingPlanHistoryEntity>(&mut conn)
            .optional()?;

        Ok(current)
    }

    async fn close(&self, history_id: Uuid, end_date: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(pricing_plan_histories::table.filter(pricing_plan_histories::id.eq(history_id)))
            .set(pricing_plan_histories::end_date.eq(Some(end_date)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_expired(&self, history_id: Uuid, end_date: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(pricing_plan_histories::table.filter(pricing_plan_histories::id.eq(history_id)))
            .set((
                pricing_plan_histories::status.eq(PricingHistoryStatus::Expired.to_string()),
                pricing_plan_histories::end_date.eq(Some(end_date)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_renewal_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PricingPlanHistoryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let due = pricing_plan_histories::table
            .filter(pricing_plan_histories::end_date.is_null())
            .filter(pricing_plan_histories::status.eq(PricingHistoryStatus::Success.to_string()))
            .filter(pricing_plan_histories::expire_at.le(now))
            .order(pricing_plan_histories::expire_at.asc())
            .select(PricingPlanHistoryEntity::as_select())
            .load::<PricingPlanHistoryEntity>(&mut conn)?;

        Ok(due)
    }
}
