use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The payment instrument was refused; retrying will not help.
    #[error("payment declined: {0}")]
    Declined(String),
    /// The gateway could not be reached or answered with a transient error.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// External payment collaborator. `charge` returns the provider's
/// transaction id on success.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        amount: i32,
        currency: &str,
        payment_ref: &str,
    ) -> Result<String, PaymentError>;
}
