use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Publication lifecycle of a post. Strictly forward-moving; the only
/// backwards edge is the user-initiated rollback to `Draft` before
/// processing starts.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProcessStatus {
    #[default]
    Draft,
    Scheduled,
    Processing,
    Published,
}

impl Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ProcessStatus::Draft => "draft",
            ProcessStatus::Scheduled => "scheduled",
            ProcessStatus::Processing => "processing",
            ProcessStatus::Published => "published",
        };
        write!(f, "{}", status)
    }
}

impl ProcessStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ProcessStatus::Draft),
            "scheduled" => Some(ProcessStatus::Scheduled),
            "processing" => Some(ProcessStatus::Processing),
            "published" => Some(ProcessStatus::Published),
            _ => None,
        }
    }

    /// Whether the post may still be pulled back to draft by its owner.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, ProcessStatus::Draft | ProcessStatus::Scheduled)
    }
}
