//! Warning accumulator and advisory threat scores
//!
//! Per-(user, community) counters backing the escalation policy. Warning
//! counts decay: after `decay_window` of inactivity the count resets to
//! zero before the next increment. Counters are in-memory and
//! intentionally volatile across restarts.
//!
//! The threat score is a parallel, independently-addressable signal
//! adjusted by human review flows. It is never decayed and never read by
//! the escalation decision; the two counters are deliberately decoupled.

use crate::{CommunityId, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningState {
    pub count: u32,
    pub last_increment: DateTime<Utc>,
}

/// Warning counts keyed by (user, community). The DashMap entry guard
/// serializes the increment-with-decay read-modify-write per key.
pub struct WarningStore {
    states: DashMap<(UserId, CommunityId), WarningState>,
}

impl WarningStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Record one qualifying violation and return the new count.
    ///
    /// Must be called at most once per enforced event, even when several
    /// filters triggered, so counts are not inflated per-filter.
    pub fn record_violation(
        &self,
        user: UserId,
        community: CommunityId,
        decay_window: Duration,
    ) -> u32 {
        self.record_violation_at(user, community, decay_window, Utc::now())
    }

    fn record_violation_at(
        &self,
        user: UserId,
        community: CommunityId,
        decay_window: Duration,
        now: DateTime<Utc>,
    ) -> u32 {
        let mut entry = self
            .states
            .entry((user, community))
            .or_insert_with(|| WarningState {
                count: 0,
                last_increment: now,
            });

        if is_expired(entry.last_increment, now, decay_window) {
            entry.count = 0;
        }

        entry.count += 1;
        entry.last_increment = now;
        entry.count
    }

    /// Decay-aware read: an expired state reads as zero.
    pub fn warning_count(
        &self,
        user: UserId,
        community: CommunityId,
        decay_window: Duration,
    ) -> u32 {
        match self.states.get(&(user, community)) {
            Some(state) if !is_expired(state.last_increment, Utc::now(), decay_window) => {
                state.count
            }
            _ => 0,
        }
    }

    /// Operator reset.
    pub fn reset(&self, user: UserId, community: CommunityId) {
        self.states.remove(&(user, community));
        log::info!("Warnings reset for user {} in community {}", user, community);
    }

    /// Drop expired states. States are also implicitly garbage-collected
    /// by decay-aware reads; this just reclaims memory.
    pub fn prune_expired(&self, decay_window: Duration) {
        let now = Utc::now();
        self.states
            .retain(|_, state| !is_expired(state.last_increment, now, decay_window));
    }

    pub fn tracked_users(&self) -> usize {
        self.states.len()
    }
}

impl Default for WarningStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_expired(last: DateTime<Utc>, now: DateTime<Utc>, decay_window: Duration) -> bool {
    match now.signed_duration_since(last).to_std() {
        Ok(elapsed) => elapsed > decay_window,
        // `last` in the future (clock skew); treat as fresh.
        Err(_) => false,
    }
}

/// Advisory per-user risk metric for human reviewers. Read-only input to
/// reporting, never to automated escalation.
pub struct ThreatScores {
    scores: DashMap<(UserId, CommunityId), i64>,
}

impl ThreatScores {
    pub fn new() -> Self {
        Self {
            scores: DashMap::new(),
        }
    }

    /// Apply a signed adjustment and return the new score.
    pub fn adjust(&self, user: UserId, community: CommunityId, delta: i64) -> i64 {
        let mut entry = self.scores.entry((user, community)).or_insert(0);
        *entry += delta;
        *entry
    }

    pub fn get(&self, user: UserId, community: CommunityId) -> i64 {
        self.scores
            .get(&(user, community))
            .map(|score| *score)
            .unwrap_or(0)
    }

    pub fn reset(&self, user: UserId, community: CommunityId) {
        self.scores.remove(&(user, community));
    }
}

impl Default for ThreatScores {
    fn default() -> Self {
        Self::new()
    }
}
