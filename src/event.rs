//! Inbound event model
//!
//! One user-generated message as delivered by the platform gateway.
//! Ephemeral: consumed once by the enforcement pipeline, never persisted.

use crate::{ChannelId, CommunityId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Platform message identifier, used for best-effort deletion.
    pub message_id: String,
    pub author_id: UserId,
    /// Automated-origin events (bots, webhooks) are never enforced against.
    pub author_is_bot: bool,
    pub community_id: CommunityId,
    pub channel_id: ChannelId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Convenience constructor stamping the event with the current time.
    pub fn now(
        message_id: impl Into<String>,
        author_id: UserId,
        community_id: CommunityId,
        channel_id: ChannelId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            author_id,
            author_is_bot: false,
            community_id,
            channel_id,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
