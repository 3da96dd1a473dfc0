pub mod billing_cycles;
pub mod generate_statuses;
pub mod platforms;
pub mod pricing_history_statuses;
pub mod process_statuses;
pub mod statuses;
pub mod video_types;
