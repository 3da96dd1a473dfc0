use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::generate_histories;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = generate_histories)]
pub struct GenerateHistoryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub input: String,
    pub output: Option<String>,
    pub credit: i32,
    // NULL while the generation is still running; SUCCESS/FAILED once settled.
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generate_histories)]
pub struct InsertGenerateHistoryEntity {
    pub user_id: Uuid,
    pub input: String,
    pub output: Option<String>,
    pub credit: i32,
    pub status: Option<String>,
    pub error_message: Option<String>,
}
