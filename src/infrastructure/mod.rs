pub mod notifications;
pub mod postgres;
