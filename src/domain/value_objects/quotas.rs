use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two independent allowance axes tracked per user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuotaDimension {
    Credit,
    Capacity,
}

impl Display for QuotaDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dimension = match self {
            QuotaDimension::Credit => "credit",
            QuotaDimension::Capacity => "capacity",
        };
        write!(f, "{}", dimension)
    }
}

/// Handle for a provisional quota debit. Holding it is the only way to
/// release the debited amount; releasing the same handle twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dimension: QuotaDimension,
    pub amount: i32,
}

/// New per-cycle allowances granted at subscription or renewal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub credit: i32,
    pub capacity: i32,
}
