use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VideoType {
    Video,
    Shorts,
}

impl Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let video_type = match self {
            VideoType::Video => "video",
            VideoType::Shorts => "shorts",
        };
        write!(f, "{}", video_type)
    }
}

impl VideoType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "video" => Some(VideoType::Video),
            "shorts" => Some(VideoType::Shorts),
            _ => None,
        }
    }
}
