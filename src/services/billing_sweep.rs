use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{error, info};

use crate::application::interfaces::notifications::NotificationSink;
use crate::application::interfaces::payments::PaymentGateway;
use crate::application::usecases::billing_cycle::BillingCycleManager;
use crate::domain::repositories::pricing_plan_histories::PricingPlanHistoryRepository;
use crate::domain::repositories::pricing_plans::PricingPlanRepository;
use crate::domain::repositories::users::UserRepository;

/// Renewal sweep loop. One pass per tick; a failing pass is logged and the
/// loop keeps going.
pub async fn run_billing_sweep_loop<U, P, H, Pay, N>(
    manager: Arc<BillingCycleManager<U, P, H, Pay, N>>,
    interval: Duration,
) where
    U: UserRepository + Send + Sync + 'static,
    P: PricingPlanRepository + Send + Sync + 'static,
    H: PricingPlanHistoryRepository + Send + Sync + 'static,
    Pay: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    loop {
        match manager.renew_due(Utc::now()).await {
            Ok(outcome) => {
                info!(
                    scanned = outcome.scanned,
                    renewed = outcome.renewed,
                    expired = outcome.expired,
                    skipped = outcome.skipped,
                    "billing: renewal sweep finished"
                );
            }
            Err(e) => {
                error!("Error while running the renewal sweep: {}", e);
            }
        }

        tokio::time::sleep(interval).await;
    }
}
