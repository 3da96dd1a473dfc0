pub mod billing_cycle;
pub mod publish_scheduler;
pub mod quota_ledger;
pub mod usage_meter;
