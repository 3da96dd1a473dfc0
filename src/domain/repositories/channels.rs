use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::channels::ChannelEntity;

#[async_trait]
#[automock]
pub trait ChannelRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ChannelEntity>>;
}
