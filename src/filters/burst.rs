//! Burst/flood detection
//!
//! Sliding-window message counting per (user, community). Each check
//! prunes the window to the active span before counting, so the cost is
//! O(events-in-window) per check with small windows.

use super::Filter;
use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;
use crate::{CommunityId, UserId};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;

/// Events allowed inside the window before the filter trips.
const DEFAULT_MAX_EVENTS: usize = 5;
/// Sliding window span in seconds.
const DEFAULT_WINDOW_SECS: i64 = 10;

pub struct BurstFilter {
    max_events: usize,
    window_secs: i64,
    /// (user, community) -> timestamps of recent events, pruned on check.
    /// The DashMap entry guard serializes updates per key.
    windows: DashMap<(UserId, CommunityId), Vec<DateTime<Utc>>>,
}

impl BurstFilter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_EVENTS, DEFAULT_WINDOW_SECS)
    }

    pub fn with_limits(max_events: usize, window_secs: i64) -> Self {
        Self {
            max_events,
            window_secs,
            windows: DashMap::new(),
        }
    }

    /// Drop windows with no recent activity. Called opportunistically by
    /// the owner; per-window pruning already happens on every check.
    pub fn prune_idle(&self, now: DateTime<Utc>) {
        let window = ChronoDuration::seconds(self.window_secs);
        self.windows
            .retain(|_, stamps| stamps.iter().any(|t| now.signed_duration_since(*t) < window));
    }
}

impl Default for BurstFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for BurstFilter {
    fn name(&self) -> &'static str {
        "burst"
    }

    fn severity(&self) -> u8 {
        5
    }

    fn suggested_action(&self) -> ActionClass {
        ActionClass::Timeout
    }

    fn check(&self, event: &Event, _config: &CommunityConfig) -> bool {
        let window = ChronoDuration::seconds(self.window_secs);
        let mut entry = self
            .windows
            .entry((event.author_id, event.community_id))
            .or_default();

        // Prune to the active window, measured from the event itself so
        // replayed/backfilled events behave deterministically.
        entry.retain(|t| event.timestamp.signed_duration_since(*t) < window);
        entry.push(event.timestamp);

        entry.len() > self.max_events
    }
}
