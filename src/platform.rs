//! Platform collaborator traits
//!
//! The chat platform executes sanctions and delivers notifications; the
//! engine only depends on these traits. Failures are opaque to us, so the
//! methods return `anyhow::Result` and the orchestrator decides what is
//! fatal (nothing is: the case record is the authoritative decision even
//! when the platform-side action could not be applied).

use crate::cases::CaseType;
use crate::event::Event;
use crate::filters::FilterHit;
use crate::{CommunityId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Executes punitive actions against the platform.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn timeout(
        &self,
        community: CommunityId,
        user: UserId,
        duration_secs: u64,
        reason: &str,
    ) -> anyhow::Result<()>;

    async fn ban(&self, community: CommunityId, user: UserId, reason: &str) -> anyhow::Result<()>;

    async fn kick(&self, community: CommunityId, user: UserId, reason: &str) -> anyhow::Result<()>;

    /// Remove the offending message. Best-effort at the call site.
    async fn delete_message(&self, event: &Event) -> anyhow::Result<()>;
}

/// Delivers notifications: subject DMs and the community mod-log channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn direct_message(&self, user: UserId, notice: &SanctionNotice) -> anyhow::Result<()>;

    async fn mod_log(&self, community: CommunityId, entry: &ModLogEntry) -> anyhow::Result<()>;
}

/// What the sanctioned user is told.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanctionNotice {
    pub community_id: CommunityId,
    pub case_id: String,
    pub action: CaseType,
    pub reason: String,
    pub duration_secs: Option<u64>,
    pub appealable: bool,
}

/// Structured entry posted to the configured moderation channel.
#[derive(Debug, Clone, Serialize)]
pub struct ModLogEntry {
    pub case_id: String,
    pub user_id: UserId,
    pub action: CaseType,
    pub warning_count: u32,
    pub triggered: Vec<FilterHit>,
    /// Original content, truncated to a fixed length.
    pub excerpt: String,
    /// Set when the platform rejected the punitive action; the case
    /// record stands regardless.
    pub execution_error: Option<String>,
}

impl ModLogEntry {
    /// Render for plain-text log sinks.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("case {}", self.case_id))
    }
}
