use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, dsl::count_star, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::pricing_plans::PricingPlanEntity;
use crate::domain::repositories::pricing_plans::PricingPlanRepository;
use crate::domain::value_objects::enums::statuses::Status;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{pricing_plan_histories, pricing_plans, users},
};

pub struct PricingPlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PricingPlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PricingPlanRepository for PricingPlanPostgres {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PricingPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Inactive plans are returned too; renewals of existing subscribers
        // keep working after a plan is retired from sale.
        let plan = pricing_plans::table
            .filter(pricing_plans::id.eq(plan_id))
            .select(PricingPlanEntity::as_select())
            .first::<PricingPlanEntity>(&mut conn)
            .optional()?;

        Ok(plan)
    }

    async fn list_active(&self) -> Result<Vec<PricingPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let plans = pricing_plans::table
            .filter(pricing_plans::status.eq(Status::Active.to_string()))
            .order(pricing_plans::price.asc())
            .select(PricingPlanEntity::as_select())
            .load::<PricingPlanEntity>(&mut conn)?;

        Ok(plans)
    }

    async fn count_references(&self, plan_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscribed_users = users::table
            .filter(users::pricing_plan_id.eq(plan_id))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        let histories = pricing_plan_histories::table
            .filter(pricing_plan_histories::pricing_plan_id.eq(plan_id))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        Ok(subscribed_users + histories)
    }

    async fn delete(&self, plan_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(pricing_plans::table.filter(pricing_plans::id.eq(plan_id))).execute(&mut conn)?;

        Ok(())
    }
}
