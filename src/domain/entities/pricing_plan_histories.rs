use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::pricing_plan_histories;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = pricing_plan_histories)]
pub struct PricingPlanHistoryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pricing_plan_id: Uuid,
    // Price and currency are snapshots taken at purchase time; later plan
    // price changes must not show up here.
    pub price: i32,
    pub currency: String,
    pub status: String,
    pub error_message: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expire_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pricing_plan_histories)]
pub struct InsertPricingPlanHistoryEntity {
    pub user_id: Uuid,
    pub pricing_plan_id: Uuid,
    pub price: i32,
    pub currency: String,
    pub status: String,
    pub error_message: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expire_at: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}
