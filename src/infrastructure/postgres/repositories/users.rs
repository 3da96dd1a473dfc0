use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::users::UserEntity;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::enums::statuses::Status;
use crate::domain::value_objects::quotas::QuotaDimension;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::users};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn try_reserve_quota(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        amount: i32,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The balance check lives inside the statement so that concurrent
        // reservations serialize on the row instead of racing a read.
        let affected = match dimension {
            QuotaDimension::Credit => update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter(users::status.eq(Status::Active.to_string()))
                    .filter(users::credit_used.le(users::credit - amount)),
            )
            .set((
                users::credit_used.eq(users::credit_used + amount),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?,
            QuotaDimension::Capacity => update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter(users::status.eq(Status::Active.to_string()))
                    .filter(users::capacity_used.le(users::capacity - amount)),
            )
            .set((
                users::capacity_used.eq(users::capacity_used + amount),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?,
        };

        Ok(affected == 1)
    }

    async fn release_quota(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        amount: i32,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Releases after a cycle reset must not drive the counter negative.
        let affected = match dimension {
            QuotaDimension::Credit => update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter(users::credit_used.ge(amount)),
            )
            .set((
                users::credit_used.eq(users::credit_used - amount),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?,
            QuotaDimension::Capacity => update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter(users::capacity_used.ge(amount)),
            )
            .set((
                users::capacity_used.eq(users::capacity_used - amount),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?,
        };

        Ok(affected == 1)
    }

    async fn reset_quota_cycle(
        &self,
        user_id: Uuid,
        credit: i32,
        capacity: i32,
        reset_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::credit.eq(credit),
                users::credit_used.eq(0),
                users::capacity.eq(capacity),
                users::capacity_used.eq(0),
                users::last_reset_date.eq(Some(reset_at)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_pricing_plan(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::pricing_plan_id.eq(plan_id),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
