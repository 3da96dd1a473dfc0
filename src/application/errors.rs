use thiserror::Error;

use crate::domain::value_objects::{
    enums::process_statuses::ProcessStatus, quotas::QuotaDimension,
};

/// Shared error taxonomy for the core. Quota and billing errors surface
/// synchronously to the caller; sweep loops recover everything else.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("insufficient {dimension} quota: requested {requested}, remaining {remaining}")]
    InsufficientQuota {
        dimension: QuotaDimension,
        requested: i32,
        remaining: i32,
    },
    #[error("payment rejected: {0}")]
    PaymentRejected(String),
    #[error("publication already in flight")]
    PublicationInFlight,
    #[error("generation already settled")]
    AlreadySettled,
    #[error("post cannot move from {from}")]
    InvalidTransition { from: ProcessStatus },
    #[error("user not found")]
    UserNotFound,
    #[error("pricing plan not found")]
    PlanNotFound,
    #[error("pricing plan is not accepting new subscribers")]
    PlanInactive,
    #[error("pricing plan is still referenced by users or histories")]
    PlanInUse,
    #[error("no current subscription")]
    SubscriptionNotFound,
    #[error("generate history not found")]
    HistoryNotFound,
    #[error("post not found")]
    PostNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
