use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PricingHistoryStatus {
    Success,
    Failed,
    Expired,
}

impl Display for PricingHistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PricingHistoryStatus::Success => "SUCCESS",
            PricingHistoryStatus::Failed => "FAILED",
            PricingHistoryStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", status)
    }
}

impl PricingHistoryStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(PricingHistoryStatus::Success),
            "FAILED" => Some(PricingHistoryStatus::Failed),
            "EXPIRED" => Some(PricingHistoryStatus::Expired),
            _ => None,
        }
    }
}
