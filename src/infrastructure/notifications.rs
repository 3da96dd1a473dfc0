use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::application::interfaces::notifications::NotificationSink;
use crate::domain::value_objects::notifications::NotificationEvent;

/// Default sink: events land in the log stream. Deployments wire a real
/// delivery channel by providing their own `NotificationSink`.
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<()> {
        match event {
            NotificationEvent::RenewalFailed {
                user_id,
                pricing_plan_id,
                reason,
            } => {
                warn!(%user_id, %pricing_plan_id, %reason, "notification: subscription renewal failed");
            }
            NotificationEvent::PublishChannelFailed {
                post_id,
                channel_id,
                platform,
                reason,
            } => {
                warn!(%post_id, %channel_id, %platform, %reason, "notification: channel publish failed");
            }
            NotificationEvent::QuotaExhausted {
                user_id,
                dimension,
                requested,
                remaining,
            } => {
                warn!(%user_id, %dimension, requested, remaining, "notification: quota exhausted");
            }
        }
        Ok(())
    }
}
