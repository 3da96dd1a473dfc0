use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::channels::ChannelEntity;
use crate::domain::repositories::channels::ChannelRepository;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::channels};

pub struct ChannelPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ChannelPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ChannelRepository for ChannelPostgres {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ChannelEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = channels::table
            .filter(channels::user_id.eq(user_id))
            .order(channels::created_at.asc())
            .select(ChannelEntity::as_select())
            .load::<ChannelEntity>(&mut conn)?;

        Ok(results)
    }
}
