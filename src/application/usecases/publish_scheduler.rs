use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::errors::{CoreError, CoreResult};
use crate::application::interfaces::notifications::NotificationSink;
use crate::application::interfaces::publishers::{ChannelPublisher, PublishError};
use crate::domain::entities::channels::ChannelEntity;
use crate::domain::entities::posts::PostEntity;
use crate::domain::repositories::channels::ChannelRepository;
use crate::domain::repositories::posts::PostRepository;
use crate::domain::value_objects::enums::platforms::Platform;
use crate::domain::value_objects::enums::process_statuses::ProcessStatus;
use crate::domain::value_objects::enums::statuses::Status;
use crate::domain::value_objects::notifications::NotificationEvent;

#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Publish attempts per (post, channel) before the channel is given up on.
    pub max_channel_attempts: u32,
    /// Posts driven concurrently within one sweep.
    pub max_in_flight: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_channel_attempts: 3,
            max_in_flight: 4,
        }
    }
}

/// Counters reported after one publication sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishSweepOutcome {
    pub picked_up: usize,
    pub published: usize,
    pub pending: usize,
    pub channel_failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelOutcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelDispatch {
    attempts: u32,
    outcome: Option<ChannelOutcome>,
}

struct DriveResult {
    published: bool,
    failed_channels: usize,
}

/// Drives posts through `draft -> scheduled -> processing -> published`,
/// fanning each one out to the owner's channels through the per-platform
/// publisher adapters.
///
/// Per-channel attempt state lives in memory, keyed by (post, channel). The
/// persisted row only moves between lifecycle states, so a restart re-drives
/// a `processing` post from scratch on the next sweep.
pub struct PublishScheduler<Po, C, N>
where
    Po: PostRepository + Send + Sync + 'static,
    C: ChannelRepository + Send + Sync + 'static,
    N: NotificationSink + 'static,
{
    post_repo: Arc<Po>,
    channel_repo: Arc<C>,
    publishers: HashMap<Platform, Arc<dyn ChannelPublisher>>,
    notification_sink: Arc<N>,
    config: PublishConfig,
    dispatch: Mutex<HashMap<(Uuid, Uuid), ChannelDispatch>>,
}

impl<Po, C, N> PublishScheduler<Po, C, N>
where
    Po: PostRepository + Send + Sync + 'static,
    C: ChannelRepository + Send + Sync + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        post_repo: Arc<Po>,
        channel_repo: Arc<C>,
        publishers: HashMap<Platform, Arc<dyn ChannelPublisher>>,
        notification_sink: Arc<N>,
        config: PublishConfig,
    ) -> Self {
        Self {
            post_repo,
            channel_repo,
            publishers,
            notification_sink,
            config,
            dispatch: Mutex::new(HashMap::new()),
        }
    }

    /// Moves a draft post onto the schedule.
    pub async fn schedule(&self, post_id: Uuid, scheduled_at: DateTime<Utc>) -> CoreResult<()> {
        let post = self.load_active_post(post_id).await?;
        let from = parse_process_status(&post)?;
        if from != ProcessStatus::Draft {
            return Err(CoreError::InvalidTransition { from });
        }
        if !self.post_repo.schedule(post_id, scheduled_at).await? {
            // Lost a race with another writer; report the state we refused on.
            return Err(CoreError::InvalidTransition { from });
        }
        info!(%post_id, %scheduled_at, "publish: post scheduled");
        Ok(())
    }

    /// Pulls a post back to draft. Allowed until the sweep picks the post
    /// up; once processing has begun the publication is in flight and the
    /// cancellation is refused.
    pub async fn cancel(&self, post_id: Uuid) -> CoreResult<()> {
        let post = self.load_active_post(post_id).await?;
        match parse_process_status(&post)? {
            ProcessStatus::Draft => Ok(()),
            ProcessStatus::Scheduled => {
                if self.post_repo.revert_to_draft(post_id).await? {
                    info!(%post_id, "publish: scheduled post cancelled back to draft");
                    Ok(())
                } else {
                    // The sweep won the race and already started processing.
                    Err(CoreError::PublicationInFlight)
                }
            }
            ProcessStatus::Processing | ProcessStatus::Published => {
                Err(CoreError::PublicationInFlight)
            }
        }
    }

    /// One publication sweep: picks up due scheduled posts in
    /// `(scheduled_at, id)` order, then drives everything currently in
    /// `processing` (fresh pickups and retry leftovers alike) with bounded
    /// concurrency.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> CoreResult<PublishSweepOutcome> {
        let mut outcome = PublishSweepOutcome::default();

        let mut in_flight = Vec::new();
        for post in self.post_repo.list_due_scheduled(now).await? {
            if self.post_repo.begin_processing(post.id).await? {
                outcome.picked_up += 1;
                in_flight.push(post);
            }
            // A false CAS means the post was cancelled or another sweep got
            // there first; either way it is not ours this round.
        }

        let picked: HashSet<Uuid> = in_flight.iter().map(|post| post.id).collect();
        for post in self.post_repo.list_processing().await? {
            if !picked.contains(&post.id) {
                in_flight.push(post);
            }
        }

        let results: Vec<CoreResult<DriveResult>> =
            futures_util::stream::iter(in_flight.into_iter().map(|post| self.drive_post(post, now)))
                .buffered(self.config.max_in_flight.max(1))
                .collect()
                .await;

        for result in results {
            match result {
                Ok(drive) => {
                    outcome.channel_failures += drive.failed_channels;
                    if drive.published {
                        outcome.published += 1;
                    } else {
                        outcome.pending += 1;
                    }
                }
                Err(err) => {
                    // The post stays in `processing`; the next sweep re-enters.
                    error!(error = ?err, "publish: driving a post failed, left for next sweep");
                    outcome.pending += 1;
                }
            }
        }

        info!(
            picked_up = outcome.picked_up,
            published = outcome.published,
            pending = outcome.pending,
            channel_failures = outcome.channel_failures,
            "publish: sweep completed"
        );
        Ok(outcome)
    }

    async fn drive_post(&self, post: PostEntity, now: DateTime<Utc>) -> CoreResult<DriveResult> {
        let channels = self.channel_repo.list_by_user(post.user_id).await?;
        let eligible = self.eligible_channels(&post, channels);

        let mut failed_channels = 0;
        let mut waiting = false;
        for (platform, channel) in &eligible {
            let key = (post.id, channel.id);
            let state = {
                let dispatch = self.dispatch_state()?;
                dispatch.get(&key).copied().unwrap_or_default()
            };
            if state.outcome.is_some() {
                continue;
            }

            let publisher = &self.publishers[platform];
            match publisher.publish(&post, channel).await {
                Ok(external_ref) => {
                    info!(
                        post_id = %post.id,
                        channel_id = %channel.id,
                        platform = %platform,
                        %external_ref,
                        "publish: channel publish succeeded"
                    );
                    self.set_outcome(key, ChannelOutcome::Succeeded)?;
                }
                Err(PublishError::Permanent(reason)) => {
                    warn!(
                        post_id = %post.id,
                        channel_id = %channel.id,
                        platform = %platform,
                        %reason,
                        "publish: channel failed permanently"
                    );
                    self.set_outcome(key, ChannelOutcome::Failed)?;
                    self.report_channel_failure(&post, channel, *platform, &reason).await;
                    failed_channels += 1;
                }
                Err(PublishError::Retryable(reason)) => {
                    let attempts = state.attempts + 1;
                    if attempts >= self.config.max_channel_attempts {
                        warn!(
                            post_id = %post.id,
                            channel_id = %channel.id,
                            platform = %platform,
                            attempts,
                            %reason,
                            "publish: channel retries exhausted"
                        );
                        self.set_outcome(key, ChannelOutcome::Failed)?;
                        let reason =
                            format!("giving up after {attempts} attempts, last error: {reason}");
                        self.report_channel_failure(&post, channel, *platform, &reason).await;
                        failed_channels += 1;
                    } else {
                        warn!(
                            post_id = %post.id,
                            channel_id = %channel.id,
                            platform = %platform,
                            attempts,
                            %reason,
                            "publish: channel failed, retrying next sweep"
                        );
                        self.dispatch_state()?.insert(
                            key,
                            ChannelDispatch {
                                attempts,
                                outcome: None,
                            },
                        );
                        waiting = true;
                    }
                }
            }
        }

        if waiting {
            return Ok(DriveResult {
                published: false,
                failed_channels,
            });
        }

        // Every attempted channel is terminal; the post is done even if some
        // channels were given up on.
        if !self.post_repo.mark_published(post.id, now).await? {
            warn!(post_id = %post.id, "publish: post no longer in processing, skipping publish mark");
        } else {
            info!(post_id = %post.id, "publish: post published");
        }
        self.dispatch_state()?
            .retain(|(post_id, _), _| *post_id != post.id);

        Ok(DriveResult {
            published: true,
            failed_channels,
        })
    }

    fn eligible_channels(
        &self,
        post: &PostEntity,
        channels: Vec<ChannelEntity>,
    ) -> Vec<(Platform, ChannelEntity)> {
        let mut eligible = Vec::new();
        for channel in channels {
            match Platform::from_str(&channel.platform) {
                Ok(platform) if self.publishers.contains_key(&platform) => {
                    eligible.push((platform, channel));
                }
                Ok(platform) => {
                    warn!(
                        post_id = %post.id,
                        channel_id = %channel.id,
                        platform = %platform,
                        "publish: no publisher registered for platform, skipping channel"
                    );
                }
                Err(reason) => {
                    warn!(
                        post_id = %post.id,
                        channel_id = %channel.id,
                        %reason,
                        "publish: channel carries unknown platform, skipping"
                    );
                }
            }
        }
        eligible
    }

    fn dispatch_state(
        &self,
    ) -> CoreResult<std::sync::MutexGuard<'_, HashMap<(Uuid, Uuid), ChannelDispatch>>> {
        self.dispatch
            .lock()
            .map_err(|_| CoreError::Internal(anyhow::anyhow!("dispatch map poisoned")))
    }

    fn set_outcome(&self, key: (Uuid, Uuid), outcome: ChannelOutcome) -> CoreResult<()> {
        let mut dispatch = self.dispatch_state()?;
        dispatch.entry(key).or_default().outcome = Some(outcome);
        Ok(())
    }

    async fn report_channel_failure(
        &self,
        post: &PostEntity,
        channel: &ChannelEntity,
        platform: Platform,
        reason: &str,
    ) {
        let event = NotificationEvent::PublishChannelFailed {
            post_id: post.id,
            channel_id: channel.id,
            platform,
            reason: reason.to_string(),
        };
        if let Err(err) = self.notification_sink.notify(event).await {
            warn!(
                post_id = %post.id,
                channel_id = %channel.id,
                error = ?err,
                "publish: notification sink failed for channel failure"
            );
        }
    }

    async fn load_active_post(&self, post_id: Uuid) -> CoreResult<PostEntity> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(CoreError::PostNotFound)?;
        // Soft-deleted posts behave as if they were gone.
        if Status::from_str(&post.status) != Some(Status::Active) {
            return Err(CoreError::PostNotFound);
        }
        Ok(post)
    }
}

fn parse_process_status(post: &PostEntity) -> CoreResult<ProcessStatus> {
    ProcessStatus::from_str(&post.process_status).ok_or_else(|| {
        CoreError::Internal(anyhow::anyhow!(
            "post {} carries unknown process status {:?}",
            post.id,
            post.process_status
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::interfaces::notifications::MockNotificationSink;
    use crate::application::interfaces::publishers::MockChannelPublisher;
    use crate::domain::repositories::channels::MockChannelRepository;
    use crate::domain::repositories::posts::MockPostRepository;
    use crate::domain::value_objects::enums::video_types::VideoType;
    use chrono::Duration;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn sample_post(process_status: ProcessStatus) -> PostEntity {
        let now = Utc::now();
        PostEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "launch teaser".to_string(),
            description: None,
            process_status: process_status.to_string(),
            status: Status::Active.to_string(),
            video_type: Some(VideoType::Shorts.to_string()),
            scheduled_at: Some(now - Duration::minutes(5)),
            published_at: None,
            views: 0,
            likes: 0,
            comments: 0,
            tags: serde_json::json!(["launch", "teaser"]),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_channel(user_id: Uuid, platform: Platform) -> ChannelEntity {
        let now = Utc::now();
        ChannelEntity {
            id: Uuid::new_v4(),
            user_id,
            platform: platform.to_string(),
            channel_id: format!("{platform}-123"),
            channel_name: Some("main".to_string()),
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn quiet_sink() -> MockNotificationSink {
        let mut sink = MockNotificationSink::new();
        sink.expect_notify().never();
        sink
    }

    fn serial_config(max_channel_attempts: u32) -> PublishConfig {
        PublishConfig {
            max_channel_attempts,
            max_in_flight: 1,
        }
    }

    fn scheduler_under_test(
        posts: MockPostRepository,
        channels: MockChannelRepository,
        publishers: HashMap<Platform, Arc<dyn ChannelPublisher>>,
        sink: MockNotificationSink,
        config: PublishConfig,
    ) -> PublishScheduler<MockPostRepository, MockChannelRepository, MockNotificationSink> {
        PublishScheduler::new(
            Arc::new(posts),
            Arc::new(channels),
            publishers,
            Arc::new(sink),
            config,
        )
    }

    #[tokio::test]
    async fn due_post_with_succeeding_channel_is_published() {
        let now = Utc::now();
        let post = sample_post(ProcessStatus::Scheduled);
        let post_id = post.id;
        let channel = sample_channel(post.user_id, Platform::YouTube);

        let mut posts = MockPostRepository::new();
        let due = post.clone();
        posts.expect_list_due_scheduled().returning(move |_| {
            let due = due.clone();
            Box::pin(async move { Ok(vec![due]) })
        });
        posts
            .expect_begin_processing()
            .with(eq(post_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));
        posts
            .expect_list_processing()
            .returning(|| Box::pin(async { Ok(vec![]) }));
        posts
            .expect_mark_published()
            .with(eq(post_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut channel_repo = MockChannelRepository::new();
        let listed = channel.clone();
        channel_repo.expect_list_by_user().returning(move |_| {
            let listed = listed.clone();
            Box::pin(async move { Ok(vec![listed]) })
        });

        let mut publisher = MockChannelPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok("yt-video-1".to_string()) }));
        let mut publishers: HashMap<Platform, Arc<dyn ChannelPublisher>> = HashMap::new();
        publishers.insert(Platform::YouTube, Arc::new(publisher));

        let scheduler =
            scheduler_under_test(posts, channel_repo, publishers, quiet_sink(), serial_config(3));

        let outcome = scheduler.run_sweep(now).await.unwrap();
        assert_eq!(outcome.picked_up, 1);
        assert_eq!(outcome.published, 1);
        assert_eq!(outcome.pending, 0);
    }

    #[tokio::test]
    async fn permanent_channel_failure_does_not_block_the_others() {
        let now = Utc::now();
        let post = sample_post(ProcessStatus::Scheduled);
        let post_id = post.id;
        let youtube = sample_channel(post.user_id, Platform::YouTube);
        let tiktok = sample_channel(post.user_id, Platform::TikTok);
        let tiktok_id = tiktok.id;

        let mut posts = MockPostRepository::new();
        let due = post.clone();
        posts.expect_list_due_scheduled().returning(move |_| {
            let due = due.clone();
            Box::pin(async move { Ok(vec![due]) })
        });
        posts
            .expect_begin_processing()
            .returning(|_| Box::pin(async { Ok(true) }));
        posts
            .expect_list_processing()
            .returning(|| Box::pin(async { Ok(vec![]) }));
        posts
            .expect_mark_published()
            .with(eq(post_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut channel_repo = MockChannelRepository::new();
        let listed = vec![youtube.clone(), tiktok.clone()];
        channel_repo.expect_list_by_user().returning(move |_| {
            let listed = listed.clone();
            Box::pin(async move { Ok(listed) })
        });

        let mut youtube_publisher = MockChannelPublisher::new();
        youtube_publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok("yt-video-1".to_string()) }));
        let mut tiktok_publisher = MockChannelPublisher::new();
        tiktok_publisher.expect_publish().times(1).returning(|_, _| {
            Box::pin(async { Err(PublishError::Permanent("account suspended".to_string())) })
        });
        let mut publishers: HashMap<Platform, Arc<dyn ChannelPublisher>> = HashMap::new();
        publishers.insert(Platform::YouTube, Arc::new(youtube_publisher));
        publishers.insert(Platform::TikTok, Arc::new(tiktok_publisher));

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(move |event| {
                matches!(
                    event,
                    NotificationEvent::PublishChannelFailed { channel_id, .. }
                        if *channel_id == tiktok_id
                )
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let scheduler =
            scheduler_under_test(posts, channel_repo, publishers, sink, serial_config(3));

        let outcome = scheduler.run_sweep(now).await.unwrap();
        assert_eq!(outcome.published, 1);
        assert_eq!(outcome.channel_failures, 1);
    }

    #[tokio::test]
    async fn retryable_failure_is_retried_on_the_next_sweep_then_gives_up() {
        let now = Utc::now();
        let post = sample_post(ProcessStatus::Scheduled);
        let post_id = post.id;
        let channel = sample_channel(post.user_id, Platform::Instagram);

        let mut posts = MockPostRepository::new();
        let due = post.clone();
        posts
            .expect_list_due_scheduled()
            .times(1)
            .returning(move |_| {
                let due = due.clone();
                Box::pin(async move { Ok(vec![due]) })
            });
        posts
            .expect_list_due_scheduled()
            .returning(|_| Box::pin(async { Ok(vec![]) }));
        posts
            .expect_begin_processing()
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));
        let leftover = post.clone();
        posts
            .expect_list_processing()
            .times(1)
            .returning(|| Box::pin(async { Ok(vec![]) }));
        posts.expect_list_processing().returning(move || {
            let leftover = leftover.clone();
            Box::pin(async move { Ok(vec![leftover]) })
        });
        posts
            .expect_mark_published()
            .with(eq(post_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut channel_repo = MockChannelRepository::new();
        let listed = channel.clone();
        channel_repo.expect_list_by_user().returning(move |_| {
            let listed = listed.clone();
            Box::pin(async move { Ok(vec![listed]) })
        });

        let mut publisher = MockChannelPublisher::new();
        publisher.expect_publish().times(2).returning(|_, _| {
            Box::pin(async { Err(PublishError::Retryable("rate limited".to_string())) })
        });
        let mut publishers: HashMap<Platform, Arc<dyn ChannelPublisher>> = HashMap::new();
        publishers.insert(Platform::Instagram, Arc::new(publisher));

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(move |event| {
                matches!(
                    event,
                    NotificationEvent::PublishChannelFailed { post_id: pid, .. } if *pid == post_id
                )
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let scheduler =
            scheduler_under_test(posts, channel_repo, publishers, sink, serial_config(2));

        // First sweep: pickup plus first attempt, post stays processing.
        let first = scheduler.run_sweep(now).await.unwrap();
        assert_eq!(first.picked_up, 1);
        assert_eq!(first.published, 0);
        assert_eq!(first.pending, 1);

        // Second sweep: second attempt exhausts the retries; the post still
        // finishes instead of being stuck in processing forever.
        let second = scheduler.run_sweep(now).await.unwrap();
        assert_eq!(second.published, 1);
        assert_eq!(second.channel_failures, 1);
    }

    #[tokio::test]
    async fn due_posts_are_picked_up_in_repository_order() {
        let now = Utc::now();
        let first = sample_post(ProcessStatus::Scheduled);
        let second = sample_post(ProcessStatus::Scheduled);
        let (first_id, second_id) = (first.id, second.id);

        let mut posts = MockPostRepository::new();
        let due = vec![first.clone(), second.clone()];
        posts.expect_list_due_scheduled().returning(move |_| {
            let due = due.clone();
            Box::pin(async move { Ok(due) })
        });
        let mut seq = Sequence::new();
        posts
            .expect_begin_processing()
            .with(eq(first_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Box::pin(async { Ok(true) }));
        posts
            .expect_begin_processing()
            .with(eq(second_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Box::pin(async { Ok(true) }));
        posts
            .expect_list_processing()
            .returning(|| Box::pin(async { Ok(vec![]) }));
        posts
            .expect_mark_published()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_list_by_user()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let scheduler = scheduler_under_test(
            posts,
            channel_repo,
            HashMap::new(),
            quiet_sink(),
            serial_config(3),
        );

        // No channels at all: both posts publish vacuously, in order.
        let outcome = scheduler.run_sweep(now).await.unwrap();
        assert_eq!(outcome.published, 2);
    }

    #[tokio::test]
    async fn cancelling_a_scheduled_post_reverts_it_to_draft() {
        let post = sample_post(ProcessStatus::Scheduled);
        let post_id = post.id;

        let mut posts = MockPostRepository::new();
        let found = post.clone();
        posts.expect_find_by_id().returning(move |_| {
            let found = found.clone();
            Box::pin(async move { Ok(Some(found)) })
        });
        posts
            .expect_revert_to_draft()
            .with(eq(post_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(true) }));

        let scheduler = scheduler_under_test(
            posts,
            MockChannelRepository::new(),
            HashMap::new(),
            quiet_sink(),
            serial_config(3),
        );

        scheduler.cancel(post_id).await.unwrap();
    }

    #[tokio::test]
    async fn cancelling_a_processing_post_is_refused() {
        let post = sample_post(ProcessStatus::Processing);
        let post_id = post.id;

        let mut posts = MockPostRepository::new();
        let found = post.clone();
        posts.expect_find_by_id().returning(move |_| {
            let found = found.clone();
            Box::pin(async move { Ok(Some(found)) })
        });
        posts.expect_revert_to_draft().never();

        let scheduler = scheduler_under_test(
            posts,
            MockChannelRepository::new(),
            HashMap::new(),
            quiet_sink(),
            serial_config(3),
        );

        let err = scheduler.cancel(post_id).await.unwrap_err();
        assert!(matches!(err, CoreError::PublicationInFlight));
    }

    #[tokio::test]
    async fn cancel_losing_the_race_with_the_sweep_is_refused() {
        let post = sample_post(ProcessStatus::Scheduled);
        let post_id = post.id;

        let mut posts = MockPostRepository::new();
        let found = post.clone();
        posts.expect_find_by_id().returning(move |_| {
            let found = found.clone();
            Box::pin(async move { Ok(Some(found)) })
        });
        // CAS refuses: the sweep already moved the post to processing.
        posts
            .expect_revert_to_draft()
            .returning(|_| Box::pin(async { Ok(false) }));

        let scheduler = scheduler_under_test(
            posts,
            MockChannelRepository::new(),
            HashMap::new(),
            quiet_sink(),
            serial_config(3),
        );

        let err = scheduler.cancel(post_id).await.unwrap_err();
        assert!(matches!(err, CoreError::PublicationInFlight));
    }

    #[tokio::test]
    async fn scheduling_a_non_draft_post_is_rejected() {
        let post = sample_post(ProcessStatus::Published);

        let mut posts = MockPostRepository::new();
        let found = post.clone();
        posts.expect_find_by_id().returning(move |_| {
            let found = found.clone();
            Box::pin(async move { Ok(Some(found)) })
        });
        posts.expect_schedule().never();

        let scheduler = scheduler_under_test(
            posts,
            MockChannelRepository::new(),
            HashMap::new(),
            quiet_sink(),
            serial_config(3),
        );

        let err = scheduler
            .schedule(post.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: ProcessStatus::Published
            }
        ));
    }
}
