use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::posts::PostEntity;
use crate::domain::repositories::posts::PostRepository;
use crate::domain::value_objects::enums::process_statuses::ProcessStatus;
use crate::domain::value_objects::enums::statuses::Status;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::posts};

pub struct PostPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PostPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PostRepository for PostPostgres {
    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<PostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let post = posts::table
            .filter(posts::id.eq(post_id))
            .select(PostEntity::as_select())
            .first::<PostEntity>(&mut conn)
            .optional()?;

        Ok(post)
    }

    async fn list_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<PostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let due = posts::table
            .filter(posts::status.eq(Status::Active.to_string()))
            .filter(posts::process_status.eq(ProcessStatus::Scheduled.to_string()))
            .filter(posts::scheduled_at.le(now))
            .order((posts::scheduled_at.asc(), posts::id.asc()))
            .select(PostEntity::as_select())
            .load::<PostEntity>(&mut conn)?;

        Ok(due)
    }

    async fn list_processing(&self) -> Result<Vec<PostEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let processing = posts::table
            .filter(posts::status.eq(Status::Active.to_string()))
            .filter(posts::process_status.eq(ProcessStatus::Processing.to_string()))
            .order((posts::scheduled_at.asc(), posts::id.asc()))
            .select(PostEntity::as_select())
            .load::<PostEntity>(&mut conn)?;

        Ok(processing)
    }

    async fn begin_processing(&self, post_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::process_status.eq(ProcessStatus::Scheduled.to_string())),
        )
        .set((
            posts::process_status.eq(ProcessStatus::Processing.to_string()),
            posts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn mark_published(&self, post_id: Uuid, published_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::process_status.eq(ProcessStatus::Processing.to_string())),
        )
        .set((
            posts::process_status.eq(ProcessStatus::Published.to_string()),
            posts::published_at.eq(Some(published_at)),
            posts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn schedule(&self, post_id: Uuid, scheduled_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::status.eq(Status::Active.to_string()))
                .filter(posts::process_status.eq(ProcessStatus::Draft.to_string())),
        )
        .set((
            posts::process_status.eq(ProcessStatus::Scheduled.to_string()),
            posts::scheduled_at.eq(Some(scheduled_at)),
            posts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn revert_to_draft(&self, post_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            posts::table
                .filter(posts::id.eq(post_id))
                .filter(posts::process_status.eq(ProcessStatus::Scheduled.to_string())),
        )
        .set((
            posts::process_status.eq(ProcessStatus::Draft.to_string()),
            posts::scheduled_at.eq(None::<DateTime<Utc>>),
            posts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }
}
