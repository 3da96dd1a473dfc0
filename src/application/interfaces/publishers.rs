use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{channels::ChannelEntity, posts::PostEntity};

#[derive(Debug, Error)]
pub enum PublishError {
    /// Transient platform failure; the scheduler retries on a later sweep.
    #[error("retryable channel error: {0}")]
    Retryable(String),
    /// Non-retryable failure; recorded and the channel is given up on.
    #[error("permanent channel error: {0}")]
    Permanent(String),
}

/// Per-platform publishing adapter. Returns the platform's reference for the
/// published content.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ChannelPublisher: Send + Sync {
    async fn publish(
        &self,
        post: &PostEntity,
        channel: &ChannelEntity,
    ) -> Result<String, PublishError>;
}
