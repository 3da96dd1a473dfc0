use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Soft-delete flag shared by users, plans and posts.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Status::Active => "ACTIVE",
            Status::Inactive => "INACTIVE",
        };
        write!(f, "{}", status)
    }
}

impl Status {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Status::Active),
            "INACTIVE" => Some(Status::Inactive),
            _ => None,
        }
    }
}
