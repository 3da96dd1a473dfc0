use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Settled outcome of a generation. A history row awaiting settlement
/// carries no status at all (NULL column), so the persisted value set
/// stays exactly SUCCESS/FAILED.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GenerateStatus {
    Success,
    Failed,
}

impl Display for GenerateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            GenerateStatus::Success => "SUCCESS",
            GenerateStatus::Failed => "FAILED",
        };
        write!(f, "{}", status)
    }
}

impl GenerateStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(GenerateStatus::Success),
            "FAILED" => Some(GenerateStatus::Failed),
            _ => None,
        }
    }
}
