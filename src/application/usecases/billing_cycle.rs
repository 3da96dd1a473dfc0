use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::errors::{CoreError, CoreResult};
use crate::application::interfaces::notifications::NotificationSink;
use crate::application::interfaces::payments::{PaymentError, PaymentGateway};
use crate::application::usecases::quota_ledger::QuotaLedger;
use crate::domain::entities::pricing_plan_histories::{
    InsertPricingPlanHistoryEntity, PricingPlanHistoryEntity,
};
use crate::domain::entities::pricing_plans::PricingPlanEntity;
use crate::domain::repositories::pricing_plan_histories::PricingPlanHistoryRepository;
use crate::domain::repositories::pricing_plans::PricingPlanRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::enums::billing_cycles::BillingCycle;
use crate::domain::value_objects::enums::pricing_history_statuses::PricingHistoryStatus;
use crate::domain::value_objects::enums::statuses::Status;
use crate::domain::value_objects::notifications::NotificationEvent;
use crate::domain::value_objects::quotas::QuotaLimits;

#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Charge attempts per renewal before the subscription expires.
    pub max_payment_attempts: u32,
    /// Base delay between attempts; doubles after each failure.
    pub payment_retry_backoff: Duration,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            max_payment_attempts: 3,
            payment_retry_backoff: Duration::from_secs(5),
        }
    }
}

/// Counters reported after one renewal sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenewalSweepOutcome {
    pub scanned: usize,
    pub renewed: usize,
    pub expired: usize,
    pub skipped: usize,
}

/// Drives the subscription lifecycle and writes the immutable
/// `pricing_plan_histories` audit trail. Quota grants go through the ledger;
/// the money side goes through the external payment gateway.
pub struct BillingCycleManager<U, P, H, Pay, N>
where
    U: UserRepository + Send + Sync + 'static,
    P: PricingPlanRepository + Send + Sync + 'static,
    H: PricingPlanHistoryRepository + Send + Sync + 'static,
    Pay: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    user_repo: Arc<U>,
    plan_repo: Arc<P>,
    history_repo: Arc<H>,
    payment_gateway: Arc<Pay>,
    notification_sink: Arc<N>,
    ledger: Arc<QuotaLedger<U>>,
    config: BillingConfig,
}

impl<U, P, H, Pay, N> BillingCycleManager<U, P, H, Pay, N>
where
    U: UserRepository + Send + Sync + 'static,
    P: PricingPlanRepository + Send + Sync + 'static,
    H: PricingPlanHistoryRepository + Send + Sync + 'static,
    Pay: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        plan_repo: Arc<P>,
        history_repo: Arc<H>,
        payment_gateway: Arc<Pay>,
        notification_sink: Arc<N>,
        ledger: Arc<QuotaLedger<U>>,
        config: BillingConfig,
    ) -> Self {
        Self {
            user_repo,
            plan_repo,
            history_repo,
            payment_gateway,
            notification_sink,
            ledger,
            config,
        }
    }

    pub async fn list_plans(&self) -> CoreResult<Vec<PricingPlanEntity>> {
        Ok(self.plan_repo.list_active().await?)
    }

    pub async fn current_subscription(
        &self,
        user_id: Uuid,
    ) -> CoreResult<Option<PricingPlanHistoryEntity>> {
        Ok(self.history_repo.find_current(user_id).await?)
    }

    /// Purchases a plan for a user. A declined charge leaves a FAILED history
    /// row behind and grants nothing; a successful one closes any prior
    /// subscription, snapshots the plan price into a new SUCCESS history and
    /// resets the user's quotas to the plan allowances.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        payment_ref: &str,
    ) -> CoreResult<Uuid> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(CoreError::UserNotFound)?;

        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or(CoreError::PlanNotFound)?;
        if Status::from_str(&plan.status) != Some(Status::Active) {
            warn!(%user_id, %plan_id, "billing: plan is inactive, refusing subscription");
            return Err(CoreError::PlanInactive);
        }
        let cycle = parse_cycle(&plan)?;

        let now = Utc::now();
        let transaction_id = match self
            .payment_gateway
            .charge(user_id, plan_id, plan.price, &plan.currency, payment_ref)
            .await
        {
            Ok(transaction_id) => transaction_id,
            Err(err) => {
                warn!(
                    %user_id,
                    %plan_id,
                    error = %err,
                    "billing: charge rejected at subscription"
                );
                self.history_repo
                    .create(InsertPricingPlanHistoryEntity {
                        user_id,
                        pricing_plan_id: plan_id,
                        price: plan.price,
                        currency: plan.currency.clone(),
                        status: PricingHistoryStatus::Failed.to_string(),
                        error_message: Some(err.to_string()),
                        start_date: now,
                        end_date: Some(now),
                        expire_at: now,
                        payment_method: Some(payment_ref.to_string()),
                        transaction_id: None,
                    })
                    .await?;
                return Err(CoreError::PaymentRejected(err.to_string()));
            }
        };

        if let Some(current) = self.history_repo.find_current(user_id).await? {
            info!(
                %user_id,
                prior_history_id = %current.id,
                "billing: closing prior subscription before new purchase"
            );
            self.history_repo.close(current.id, now).await?;
        }

        let history_id = self
            .history_repo
            .create(InsertPricingPlanHistoryEntity {
                user_id,
                pricing_plan_id: plan_id,
                price: plan.price,
                currency: plan.currency.clone(),
                status: PricingHistoryStatus::Success.to_string(),
                error_message: None,
                start_date: now,
                end_date: None,
                expire_at: now + cycle.interval(),
                payment_method: Some(payment_ref.to_string()),
                transaction_id: Some(transaction_id),
            })
            .await?;

        self.ledger
            .reset_cycle(
                user_id,
                QuotaLimits {
                    credit: plan.credit,
                    capacity: plan.capacity,
                },
            )
            .await?;
        self.user_repo.set_pricing_plan(user_id, Some(plan_id)).await?;

        info!(
            %user_id,
            %plan_id,
            %history_id,
            cycle = %cycle,
            "billing: subscription activated"
        );
        Ok(history_id)
    }

    /// Renewal sweep: every current subscription whose `expire_at` has passed
    /// is either rolled into a fresh cycle or expired. One failing user never
    /// aborts the sweep.
    pub async fn renew_due(&self, now: DateTime<Utc>) -> CoreResult<RenewalSweepOutcome> {
        let due = self.history_repo.list_renewal_due(now).await?;
        let mut outcome = RenewalSweepOutcome {
            scanned: due.len(),
            ..Default::default()
        };

        for history in due {
            match self.renew_one(&history, now).await {
                Ok(true) => outcome.renewed += 1,
                Ok(false) => outcome.expired += 1,
                Err(err) => {
                    error!(
                        user_id = %history.user_id,
                        history_id = %history.id,
                        error = ?err,
                        "billing: renewal errored, will retry next sweep"
                    );
                    outcome.skipped += 1;
                }
            }
        }

        info!(
            scanned = outcome.scanned,
            renewed = outcome.renewed,
            expired = outcome.expired,
            skipped = outcome.skipped,
            "billing: renewal sweep completed"
        );
        Ok(outcome)
    }

    /// Renews one subscription; Ok(true) when a new cycle started, Ok(false)
    /// when the subscription expired instead.
    async fn renew_one(
        &self,
        history: &PricingPlanHistoryEntity,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let Some(plan) = self.plan_repo.find_by_id(history.pricing_plan_id).await? else {
            warn!(
                user_id = %history.user_id,
                plan_id = %history.pricing_plan_id,
                "billing: plan gone, expiring subscription"
            );
            self.expire(history, now, "pricing plan no longer exists").await?;
            return Ok(false);
        };
        // Plans made inactive after purchase keep renewing; only new
        // subscribers are refused.
        let cycle = parse_cycle(&plan)?;
        let payment_ref = history.payment_method.clone().unwrap_or_default();

        let transaction_id = match self
            .charge_with_retry(history.user_id, plan.id, plan.price, &plan.currency, &payment_ref)
            .await
        {
            Ok(transaction_id) => transaction_id,
            Err(err) => {
                self.expire(history, now, &err.to_string()).await?;
                return Ok(false);
            }
        };

        self.history_repo.close(history.id, now).await?;
        let history_id = self
            .history_repo
            .create(InsertPricingPlanHistoryEntity {
                user_id: history.user_id,
                pricing_plan_id: plan.id,
                price: plan.price,
                currency: plan.currency.clone(),
                status: PricingHistoryStatus::Success.to_string(),
                error_message: None,
                start_date: now,
                end_date: None,
                expire_at: now + cycle.interval(),
                payment_method: history.payment_method.clone(),
                transaction_id: Some(transaction_id),
            })
            .await?;
        self.ledger
            .reset_cycle(
                history.user_id,
                QuotaLimits {
                    credit: plan.credit,
                    capacity: plan.capacity,
                },
            )
            .await?;

        info!(
            user_id = %history.user_id,
            plan_id = %plan.id,
            %history_id,
            "billing: subscription renewed"
        );
        Ok(true)
    }

    /// Cancels the current subscription. Quota already granted for the
    /// running period stays with the user.
    pub async fn cancel(&self, user_id: Uuid) -> CoreResult<()> {
        let current = self
            .history_repo
            .find_current(user_id)
            .await?
            .ok_or(CoreError::SubscriptionNotFound)?;

        let now = Utc::now();
        self.history_repo.close(current.id, now).await?;
        self.user_repo.set_pricing_plan(user_id, None).await?;

        info!(%user_id, history_id = %current.id, "billing: subscription cancelled");
        Ok(())
    }

    /// Deletes a plan, refusing while any user or history still points at it.
    pub async fn delete_plan(&self, plan_id: Uuid) -> CoreResult<()> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or(CoreError::PlanNotFound)?;

        let references = self.plan_repo.count_references(plan_id).await?;
        if references > 0 {
            warn!(%plan_id, references, "billing: plan still referenced, refusing delete");
            return Err(CoreError::PlanInUse);
        }
        self.plan_repo.delete(plan_id).await?;
        info!(%plan_id, "billing: plan deleted");
        Ok(())
    }

    async fn charge_with_retry(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        amount: i32,
        currency: &str,
        payment_ref: &str,
    ) -> Result<String, PaymentError> {
        let mut attempt = 1;
        loop {
            match self
                .payment_gateway
                .charge(user_id, plan_id, amount, currency, payment_ref)
                .await
            {
                Ok(transaction_id) => return Ok(transaction_id),
                Err(PaymentError::Declined(reason)) => {
                    warn!(%user_id, %plan_id, reason, "billing: renewal charge declined");
                    return Err(PaymentError::Declined(reason));
                }
                Err(PaymentError::Unavailable(reason)) => {
                    if attempt >= self.config.max_payment_attempts {
                        warn!(
                            %user_id,
                            %plan_id,
                            attempt,
                            reason,
                            "billing: renewal charge attempts exhausted"
                        );
                        return Err(PaymentError::Unavailable(reason));
                    }
                    let backoff = self.config.payment_retry_backoff * 2u32.pow(attempt - 1);
                    warn!(
                        %user_id,
                        %plan_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        reason,
                        "billing: renewal charge failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Closes a subscription as EXPIRED. Remaining quota balances are left
    /// as they are: the user stops receiving new allowance but keeps what
    /// the last successful cycle granted.
    async fn expire(
        &self,
        history: &PricingPlanHistoryEntity,
        now: DateTime<Utc>,
        reason: &str,
    ) -> CoreResult<()> {
        self.history_repo.mark_expired(history.id, now).await?;
        let event = NotificationEvent::RenewalFailed {
            user_id: history.user_id,
            pricing_plan_id: history.pricing_plan_id,
            reason: reason.to_string(),
        };
        if let Err(err) = self.notification_sink.notify(event).await {
            warn!(
                user_id = %history.user_id,
                error = ?err,
                "billing: notification sink failed for renewal failure"
            );
        }
        info!(
            user_id = %history.user_id,
            history_id = %history.id,
            reason,
            "billing: subscription expired"
        );
        Ok(())
    }
}

fn parse_cycle(plan: &PricingPlanEntity) -> CoreResult<BillingCycle> {
    BillingCycle::from_str(&plan.billing_cycle).ok_or_else(|| {
        CoreError::Internal(anyhow::anyhow!(
            "plan {} carries unknown billing cycle {:?}",
            plan.id,
            plan.billing_cycle
        ))
    })
}
