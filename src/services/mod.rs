pub mod billing_sweep;
pub mod publish_sweep;
