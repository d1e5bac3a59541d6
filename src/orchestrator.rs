//! Enforcement orchestrator
//!
//! Ties the subsystems together per incoming event: runs the filter set,
//! updates the warning accumulator exactly once, computes the escalation,
//! writes the case, instructs the platform executor and triggers
//! notification/logging. Once an event is accepted it runs to completion;
//! platform calls are bounded by a timeout and treated as best-effort.

use crate::appeals::AppealWorkflow;
use crate::cases::{CaseInput, CaseLedger, CaseType};
use crate::config::ConfigRegistry;
use crate::escalation::{self, ActionClass};
use crate::event::Event;
use crate::filters::FilterSet;
use crate::platform::{ActionExecutor, ModLogEntry, Notifier, SanctionNotice};
use crate::store::CaseStore;
use crate::warnings::{ThreatScores, WarningStore};
use crate::{CommunityId, UserId, SYSTEM_ISSUER};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Upper bound on any single platform call. A slow platform must not
/// block processing of subsequent events.
const EXECUTOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Mod-log content excerpts are cut to this many characters.
const EXCERPT_CHARS: usize = 120;

pub struct AutomodEngine {
    configs: Arc<ConfigRegistry>,
    filters: FilterSet,
    warnings: WarningStore,
    threat: ThreatScores,
    ledger: CaseLedger,
    appeals: AppealWorkflow,
    executor: Arc<dyn ActionExecutor>,
    notifier: Arc<dyn Notifier>,
}

impl AutomodEngine {
    pub fn new(
        configs: Arc<ConfigRegistry>,
        store: Arc<dyn CaseStore>,
        executor: Arc<dyn ActionExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            configs,
            filters: FilterSet::standard(),
            warnings: WarningStore::new(),
            threat: ThreatScores::new(),
            ledger: CaseLedger::new(store.clone()),
            appeals: AppealWorkflow::new(store),
            executor,
            notifier,
        }
    }

    /// Replace the filter roster. Intended for tests and for deployments
    /// that disable individual filters.
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Fire-and-forget entry point for the platform event stream.
    ///
    /// Never returns an error: every failure mode is either logged and
    /// absorbed (platform calls, notifications) or logged and dropped
    /// (persistence, in which case no enforcement happens for this event
    /// and nothing is retried).
    pub async fn record_event(&self, event: Event) {
        // Gate: automated origins and unmoderated scopes are skipped.
        if event.author_is_bot {
            return;
        }
        let config = self.configs.get(event.community_id);
        if !config.automod_enabled || config.is_exempt_channel(event.channel_id) {
            return;
        }

        let hits = self.filters.run(&event, &config);
        if hits.is_empty() {
            return;
        }

        // Exactly one accumulator update per qualifying event, regardless
        // of how many filters triggered.
        let new_count = self.warnings.record_violation(
            event.author_id,
            event.community_id,
            config.decay_window(),
        );

        // Best-effort suppression of the offending message.
        if let Err(e) = self.bounded(self.executor.delete_message(&event)).await {
            log::warn!(
                "Could not delete message {} in community {}: {}",
                event.message_id,
                event.community_id,
                e
            );
        }

        // Hits are ordered severity-descending; the maximum dominates.
        let max_severity = hits.first().map(|h| h.severity).unwrap_or(0);
        let escalation = escalation::decide(new_count, max_severity, &config);

        let reason = hits
            .iter()
            .map(|h| h.name)
            .collect::<Vec<_>>()
            .join(", ");

        let case = match self
            .ledger
            .create_case(CaseInput {
                kind: CaseType::from(escalation.action),
                subject_id: event.author_id,
                issuer_id: SYSTEM_ISSUER,
                community_id: event.community_id,
                reason: reason.clone(),
                appealable: Some(true),
                duration_secs: escalation.duration_secs,
            })
            .await
        {
            Ok(case) => case,
            Err(e) => {
                // Store unavailable: the event is dropped from enforcement
                // and not retried, so a recovered store cannot double-count.
                log::error!(
                    "Case creation failed for user {} in community {}: {}",
                    event.author_id,
                    event.community_id,
                    e
                );
                return;
            }
        };

        let execution_error = self
            .execute_action(escalation.action, &case.case_id, &event, &reason, escalation.duration_secs)
            .await;

        // Best-effort DM; undeliverable is common (closed DMs) and never
        // retried.
        let notice = SanctionNotice {
            community_id: event.community_id,
            case_id: case.case_id.clone(),
            action: case.kind,
            reason: reason.clone(),
            duration_secs: case.duration_secs,
            appealable: case.appealable,
        };
        if let Err(e) = self.bounded(self.notifier.direct_message(event.author_id, &notice)).await {
            log::debug!("DM to user {} undeliverable: {}", event.author_id, e);
        }

        let entry = ModLogEntry {
            case_id: case.case_id.clone(),
            user_id: event.author_id,
            action: case.kind,
            warning_count: new_count,
            triggered: hits,
            excerpt: excerpt(&event.content, EXCERPT_CHARS),
            execution_error,
        };
        if let Err(e) = self.bounded(self.notifier.mod_log(event.community_id, &entry)).await {
            log::warn!(
                "Mod-log delivery failed for case {} in community {}: {}",
                case.case_id,
                event.community_id,
                e
            );
        }

        log::info!(
            "Enforced {} against user {} in community {} (case {}, warnings {})",
            case.kind,
            event.author_id,
            event.community_id,
            case.case_id,
            new_count
        );
    }

    /// Apply the decided sanction. Returns the failure description, if
    /// any, for the mod-log; the case record is never rolled back.
    async fn execute_action(
        &self,
        action: ActionClass,
        case_id: &str,
        event: &Event,
        reason: &str,
        duration_secs: Option<u64>,
    ) -> Option<String> {
        let result = match action {
            // A warn is the case itself plus the DM; no platform action.
            ActionClass::Warn => return None,
            ActionClass::Timeout => {
                self.bounded(self.executor.timeout(
                    event.community_id,
                    event.author_id,
                    duration_secs.unwrap_or(0),
                    reason,
                ))
                .await
            }
            ActionClass::Ban => {
                self.bounded(
                    self.executor
                        .ban(event.community_id, event.author_id, reason),
                )
                .await
            }
        };

        match result {
            Ok(()) => None,
            Err(e) => {
                log::error!(
                    "Platform rejected {:?} for case {} (user {}): {}",
                    action,
                    case_id,
                    event.author_id,
                    e
                );
                Some(e.to_string())
            }
        }
    }

    async fn bounded(
        &self,
        fut: impl std::future::Future<Output = anyhow::Result<()>>,
    ) -> anyhow::Result<()> {
        match timeout(EXECUTOR_TIMEOUT, fut).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "platform call timed out after {:?}",
                EXECUTOR_TIMEOUT
            )),
        }
    }

    // ------------------------------------------------------------------
    // Command-surface operations
    // ------------------------------------------------------------------

    /// Decay-aware warning count for a user.
    pub fn warning_count(&self, user: UserId, community: CommunityId) -> u32 {
        let config = self.configs.get(community);
        self.warnings
            .warning_count(user, community, config.decay_window())
    }

    /// Operator reset of a user's warning state.
    pub fn reset_warnings(&self, user: UserId, community: CommunityId) {
        self.warnings.reset(user, community);
    }

    /// Adjust the advisory threat score; returns the new value. Never
    /// read by the escalation path.
    pub fn adjust_threat(&self, user: UserId, community: CommunityId, delta: i64) -> i64 {
        self.threat.adjust(user, community, delta)
    }

    pub fn threat_score(&self, user: UserId, community: CommunityId) -> i64 {
        self.threat.get(user, community)
    }

    /// Case operations (manual cases, lookups, status changes, purge).
    pub fn ledger(&self) -> &CaseLedger {
        &self.ledger
    }

    /// Appeal operations (submit, review, reopen).
    pub fn appeals(&self) -> &AppealWorkflow {
        &self.appeals
    }

    pub fn configs(&self) -> &ConfigRegistry {
        &self.configs
    }
}

/// Cut content to at most `max_chars` characters on a char boundary,
/// marking the cut with an ellipsis.
fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_content_untouched() {
        assert_eq!(excerpt("hello", 120), "hello");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let content = "é".repeat(200);
        let cut = excerpt(&content, 120);
        assert_eq!(cut.chars().count(), 121); // 120 + ellipsis
        assert!(cut.ends_with('…'));
    }
}
