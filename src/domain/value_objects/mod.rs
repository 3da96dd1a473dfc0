pub mod enums;
pub mod notifications;
pub mod quotas;
