use anyhow::Result;
use async_trait::async_trait;

use crate::domain::value_objects::notifications::NotificationEvent;

/// External notification collaborator. Delivery (email, chat, push) happens
/// outside the core; failures here are logged and never propagated into the
/// operation that raised the event.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<()>;
}
