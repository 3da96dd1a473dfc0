pub mod notifications;
pub mod payments;
pub mod publishers;
