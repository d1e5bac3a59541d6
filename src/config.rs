//! Per-community automod configuration
//!
//! Explicit typed configuration with hot reload. Global defaults are kept
//! behind an `ArcSwap` so operators can replace them at runtime without
//! locking; per-community overrides live in a concurrent map and shadow
//! the defaults.

use crate::{ChannelId, CommunityId};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Configuration recognized by the enforcement engine for one community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Master switch; disabled communities are skipped entirely.
    pub automod_enabled: bool,
    /// Warning count at which escalation beyond a plain warn begins.
    pub warn_threshold: u32,
    /// Deny-list for the keyword filter. Matched case-insensitively.
    pub deny_list: Vec<String>,
    /// Inactivity span after which a user's warning count resets to zero
    /// before the next increment.
    pub decay_window_seconds: u64,
    /// Timeout durations keyed by severity floor: the highest floor not
    /// exceeding the event's max severity wins.
    pub mute_durations_by_severity: BTreeMap<u8, u64>,
    /// Severity at or above which escalation goes straight to a ban.
    pub ban_severity: u8,
    /// Channels excluded from moderation (e.g. staff or bot channels).
    pub exempt_channels: Vec<ChannelId>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        let mut mute_durations = BTreeMap::new();
        mute_durations.insert(4, 1800); // 30 minutes
        mute_durations.insert(6, 3600); // 1 hour

        Self {
            automod_enabled: true,
            warn_threshold: 3,
            deny_list: Vec::new(),
            decay_window_seconds: 86_400, // 24 hours
            mute_durations_by_severity: mute_durations,
            ban_severity: 8,
            exempt_channels: Vec::new(),
        }
    }
}

impl CommunityConfig {
    pub fn decay_window(&self) -> Duration {
        Duration::from_secs(self.decay_window_seconds)
    }

    /// Timeout duration for a given severity, if any floor applies.
    pub fn mute_duration_for(&self, severity: u8) -> Option<u64> {
        self.mute_durations_by_severity
            .iter()
            .rev()
            .find(|(floor, _)| severity >= **floor)
            .map(|(_, secs)| *secs)
    }

    pub fn is_exempt_channel(&self, channel: ChannelId) -> bool {
        self.exempt_channels.contains(&channel)
    }
}

/// Registry of community configurations with hot-reloadable defaults.
pub struct ConfigRegistry {
    defaults: ArcSwap<CommunityConfig>,
    overrides: DashMap<CommunityId, Arc<CommunityConfig>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self {
            defaults: ArcSwap::from_pointee(CommunityConfig::default()),
            overrides: DashMap::new(),
        }
    }

    /// Resolve the effective configuration for a community.
    pub fn get(&self, community: CommunityId) -> Arc<CommunityConfig> {
        match self.overrides.get(&community) {
            Some(config) => config.clone(),
            None => self.defaults.load_full(),
        }
    }

    /// Replace the global defaults (applies to communities without an
    /// explicit override).
    pub fn set_defaults(&self, config: CommunityConfig) {
        self.defaults.store(Arc::new(config));
        log::info!("Default automod configuration replaced");
    }

    /// Install or replace the configuration for one community.
    pub fn set_community(&self, community: CommunityId, config: CommunityConfig) {
        self.overrides.insert(community, Arc::new(config));
        log::info!("Automod configuration updated for community {}", community);
    }

    /// Drop a community's override, reverting it to the defaults.
    pub fn clear_community(&self, community: CommunityId) {
        self.overrides.remove(&community);
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CommunityConfig::default();
        assert!(config.automod_enabled);
        assert_eq!(config.warn_threshold, 3);
        assert_eq!(config.decay_window_seconds, 86_400);
        assert_eq!(config.ban_severity, 8);
    }

    #[test]
    fn test_mute_duration_floors() {
        let config = CommunityConfig::default();
        assert_eq!(config.mute_duration_for(3), None);
        assert_eq!(config.mute_duration_for(4), Some(1800));
        assert_eq!(config.mute_duration_for(5), Some(1800));
        assert_eq!(config.mute_duration_for(6), Some(3600));
        assert_eq!(config.mute_duration_for(7), Some(3600));
    }

    #[test]
    fn test_registry_override_shadows_defaults() {
        let registry = ConfigRegistry::new();
        assert!(registry.get(1).automod_enabled);

        registry.set_community(
            1,
            CommunityConfig {
                automod_enabled: false,
                ..Default::default()
            },
        );
        assert!(!registry.get(1).automod_enabled);
        assert!(registry.get(2).automod_enabled);

        registry.clear_community(1);
        assert!(registry.get(1).automod_enabled);
    }
}
