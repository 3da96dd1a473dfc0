use anyhow::{Context, Result};

use super::config_model::{BillingSweep, Database, DotEnvyConfig, PublishSweep};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
    };

    let billing = BillingSweep {
        interval_secs: std::env::var("BILLING_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .context("BILLING_SWEEP_INTERVAL_SECS is invalid")?,
        max_payment_attempts: std::env::var("PAYMENT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("PAYMENT_MAX_ATTEMPTS is invalid")?,
        payment_retry_backoff_ms: std::env::var("PAYMENT_RETRY_BACKOFF_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PAYMENT_RETRY_BACKOFF_MS is invalid")?,
    };

    let publishing = PublishSweep {
        interval_secs: std::env::var("PUBLISH_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("PUBLISH_SWEEP_INTERVAL_SECS is invalid")?,
        max_channel_attempts: std::env::var("PUBLISH_MAX_CHANNEL_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("PUBLISH_MAX_CHANNEL_ATTEMPTS is invalid")?,
        max_in_flight: std::env::var("PUBLISH_MAX_IN_FLIGHT")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("PUBLISH_MAX_IN_FLIGHT is invalid")?,
    };

    Ok(DotEnvyConfig {
        database,
        billing,
        publishing,
    })
}
