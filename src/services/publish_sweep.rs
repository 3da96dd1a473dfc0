use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::error;

use crate::application::interfaces::notifications::NotificationSink;
use crate::application::usecases::publish_scheduler::PublishScheduler;
use crate::domain::repositories::channels::ChannelRepository;
use crate::domain::repositories::posts::PostRepository;

/// Publication sweep loop. The scheduler handles per-post failures itself;
/// only a whole-pass failure surfaces here.
pub async fn run_publish_sweep_loop<Po, C, N>(
    scheduler: Arc<PublishScheduler<Po, C, N>>,
    interval: Duration,
) where
    Po: PostRepository + Send + Sync + 'static,
    C: ChannelRepository + Send + Sync + 'static,
    N: NotificationSink + 'static,
{
    loop {
        if let Err(e) = scheduler.run_sweep(Utc::now()).await {
            error!("Error while running the publication sweep: {}", e);
        }

        tokio::time::sleep(interval).await;
    }
}
