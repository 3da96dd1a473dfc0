use std::time::Duration;

use crate::application::usecases::billing_cycle::BillingConfig;
use crate::application::usecases::publish_scheduler::PublishConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub billing: BillingSweep,
    pub publishing: PublishSweep,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct BillingSweep {
    pub interval_secs: u64,
    pub max_payment_attempts: u32,
    pub payment_retry_backoff_ms: u64,
}

impl BillingSweep {
    pub fn billing_config(&self) -> BillingConfig {
        BillingConfig {
            max_payment_attempts: self.max_payment_attempts,
            payment_retry_backoff: Duration::from_millis(self.payment_retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishSweep {
    pub interval_secs: u64,
    pub max_channel_attempts: u32,
    pub max_in_flight: usize,
}

impl PublishSweep {
    pub fn publish_config(&self) -> PublishConfig {
        PublishConfig {
            max_channel_attempts: self.max_channel_attempts,
            max_in_flight: self.max_in_flight,
        }
    }
}
