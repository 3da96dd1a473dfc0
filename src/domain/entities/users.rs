use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub credit: i32,
    pub credit_used: i32,
    pub capacity: i32,
    pub capacity_used: i32,
    pub last_reset_date: Option<DateTime<Utc>>,
    pub status: String,
    pub pricing_plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn remaining_credit(&self) -> i32 {
        self.credit - self.credit_used
    }

    pub fn remaining_capacity(&self) -> i32 {
        self.capacity - self.capacity_used
    }
}
