use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::channels;

/// A user's linked external publishing destination, unique per
/// (user_id, platform, channel_id). Token refresh is the identity
/// collaborator's job; the core only reads the credentials.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = channels)]
pub struct ChannelEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
