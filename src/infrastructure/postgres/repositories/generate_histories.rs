use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::generate_histories::{
    GenerateHistoryEntity, InsertGenerateHistoryEntity,
};
use crate::domain::repositories::generate_histories::GenerateHistoryRepository;
use crate::domain::value_objects::enums::generate_statuses::GenerateStatus;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::generate_histories};

pub struct GenerateHistoryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GenerateHistoryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GenerateHistoryRepository for GenerateHistoryPostgres {
    async fn create(&self, entity: InsertGenerateHistoryEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let history_id = insert_into(generate_histories::table)
            .values(&entity)
            .returning(generate_histories::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(history_id)
    }

    async fn find_by_id(&self, history_id: Uuid) -> Result<Option<GenerateHistoryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let history = generate_histories::table
            .filter(generate_histories::id.eq(history_id))
            .select(GenerateHistoryEntity::as_select())
            .first::<GenerateHistoryEntity>(&mut conn)
            .optional()?;

        Ok(history)
    }

    async fn settle_success(
        &self,
        history_id: Uuid,
        output: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // `status IS NULL` in the statement is what makes settlement
        // exactly-once under concurrent callers.
        let affected = update(
            generate_histories::table
                .filter(generate_histories::id.eq(history_id))
                .filter(generate_histories::status.is_null()),
        )
        .set((
            generate_histories::status.eq(Some(GenerateStatus::Success.to_string())),
            generate_histories::output.eq(Some(output.to_string())),
            generate_histories::settled_at.eq(Some(settled_at)),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn settle_failed(
        &self,
        history_id: Uuid,
        error_message: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            generate_histories::table
                .filter(generate_histories::id.eq(history_id))
                .filter(generate_histories::status.is_null()),
        )
        .set((
            generate_histories::status.eq(Some(GenerateStatus::Failed.to_string())),
            generate_histories::error_message.eq(Some(error_message.to_string())),
            generate_histories::settled_at.eq(Some(settled_at)),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }
}
