use uuid::Uuid;

use crate::domain::value_objects::{
    enums::platforms::Platform, quotas::QuotaDimension,
};

/// Events handed to the external notification collaborator. The core never
/// delivers anything itself; it only reports what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    RenewalFailed {
        user_id: Uuid,
        pricing_plan_id: Uuid,
        reason: String,
    },
    PublishChannelFailed {
        post_id: Uuid,
        channel_id: Uuid,
        platform: Platform,
        reason: String,
    },
    QuotaExhausted {
        user_id: Uuid,
        dimension: QuotaDimension,
        requested: i32,
        remaining: i32,
    },
}
