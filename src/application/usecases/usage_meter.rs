use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::errors::{CoreError, CoreResult};
use crate::application::interfaces::notifications::NotificationSink;
use crate::application::usecases::quota_ledger::QuotaLedger;
use crate::domain::entities::generate_histories::InsertGenerateHistoryEntity;
use crate::domain::repositories::generate_histories::GenerateHistoryRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::enums::generate_statuses::GenerateStatus;
use crate::domain::value_objects::notifications::NotificationEvent;
use crate::domain::value_objects::quotas::{QuotaDimension, Reservation};

/// How an authorized generation ended.
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    Success { output: String },
    Failed { error_message: String },
}

/// Façade the request path calls around every billable AI generation:
/// reserve credit up front, append the audit row, reconcile at settlement.
pub struct UsageMeter<U, G, N>
where
    U: UserRepository + Send + Sync + 'static,
    G: GenerateHistoryRepository + Send + Sync + 'static,
    N: NotificationSink + 'static,
{
    ledger: Arc<QuotaLedger<U>>,
    history_repo: Arc<G>,
    notification_sink: Arc<N>,
}

impl<U, G, N> UsageMeter<U, G, N>
where
    U: UserRepository + Send + Sync + 'static,
    G: GenerateHistoryRepository + Send + Sync + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(ledger: Arc<QuotaLedger<U>>, history_repo: Arc<G>, notification_sink: Arc<N>) -> Self {
        Self {
            ledger,
            history_repo,
            notification_sink,
        }
    }

    /// Reserves `estimated_cost` credit and opens a pending history row.
    /// Fails with `InsufficientQuota` before any generation work begins.
    /// Returns the history id the caller must later settle exactly once.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        estimated_cost: i32,
        input: String,
    ) -> CoreResult<Uuid> {
        let reservation = match self
            .ledger
            .reserve(user_id, QuotaDimension::Credit, estimated_cost)
            .await
        {
            Ok(reservation) => reservation,
            Err(err) => {
                if let CoreError::InsufficientQuota {
                    dimension,
                    requested,
                    remaining,
                } = &err
                {
                    self.notify_best_effort(NotificationEvent::QuotaExhausted {
                        user_id,
                        dimension: *dimension,
                        requested: *requested,
                        remaining: *remaining,
                    })
                    .await;
                }
                return Err(err);
            }
        };

        let history_id = match self
            .history_repo
            .create(InsertGenerateHistoryEntity {
                user_id,
                input,
                output: None,
                credit: estimated_cost,
                status: None,
                error_message: None,
            })
            .await
        {
            Ok(id) => id,
            Err(err) => {
                // No audit row means nothing to settle later; give the debit
                // back right away.
                error!(
                    %user_id,
                    db_error = ?err,
                    "usage_meter: failed to open generate history, refunding"
                );
                self.ledger.release(&reservation).await?;
                return Err(CoreError::Internal(err));
            }
        };

        info!(
            %user_id,
            %history_id,
            credit = estimated_cost,
            "usage_meter: generation authorized"
        );
        Ok(history_id)
    }

    /// Settles an authorized generation exactly once. A success keeps the
    /// charge; a failure refunds the reserved credit. A second settlement of
    /// the same id fails with `AlreadySettled`.
    pub async fn settle(&self, history_id: Uuid, outcome: SettleOutcome) -> CoreResult<()> {
        let history = self
            .history_repo
            .find_by_id(history_id)
            .await?
            .ok_or(CoreError::HistoryNotFound)?;
        let settled_at = Utc::now();

        match outcome {
            SettleOutcome::Success { output } => {
                let settled = self
                    .history_repo
                    .settle_success(history_id, &output, settled_at)
                    .await?;
                if !settled {
                    return self.reject_duplicate_settlement(history_id).await;
                }
                info!(
                    %history_id,
                    user_id = %history.user_id,
                    credit = history.credit,
                    "usage_meter: generation settled as success"
                );
            }
            SettleOutcome::Failed { error_message } => {
                let settled = self
                    .history_repo
                    .settle_failed(history_id, &error_message, settled_at)
                    .await?;
                if !settled {
                    return self.reject_duplicate_settlement(history_id).await;
                }
                // Refund keyed by the history id: even if a retried refund
                // slips past the conditional update above, the ledger treats
                // the second release of the same handle as a no-op.
                self.ledger
                    .release(&Reservation {
                        id: history_id,
                        user_id: history.user_id,
                        dimension: QuotaDimension::Credit,
                        amount: history.credit,
                    })
                    .await?;
                info!(
                    %history_id,
                    user_id = %history.user_id,
                    credit = history.credit,
                    %error_message,
                    "usage_meter: generation settled as failure, credit refunded"
                );
            }
        }
        Ok(())
    }

    /// Duplicate settlement path. When the row already settled as FAILED the
    /// refund is re-driven first: a prior failed settlement may have lost its
    /// release to a transient storage error, and the release handle is
    /// idempotent, so this completes the refund or does nothing.
    async fn reject_duplicate_settlement(&self, history_id: Uuid) -> CoreResult<()> {
        let history = self
            .history_repo
            .find_by_id(history_id)
            .await?
            .ok_or(CoreError::HistoryNotFound)?;
        let settled_failed = history
            .status
            .as_deref()
            .and_then(GenerateStatus::from_str)
            == Some(GenerateStatus::Failed);
        if settled_failed {
            warn!(
                %history_id,
                user_id = %history.user_id,
                "usage_meter: duplicate settlement, re-driving refund of the failed generation"
            );
            self.ledger
                .release(&Reservation {
                    id: history_id,
                    user_id: history.user_id,
                    dimension: QuotaDimension::Credit,
                    amount: history.credit,
                })
                .await?;
        }
        Err(CoreError::AlreadySettled)
    }

    async fn notify_best_effort(&self, event: NotificationEvent) {
        if let Err(err) = self.notification_sink.notify(event).await {
            warn!(error = ?err, "usage_meter: notification sink failed");
        }
    }
}
