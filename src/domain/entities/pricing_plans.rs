use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::pricing_plans;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = pricing_plans)]
pub struct PricingPlanEntity {
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub currency: String,
    pub billing_cycle: String,
    pub credit: i32,
    pub capacity: i32,
    // Display-only ordered feature list, never interpreted by the core.
    pub features: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
