//! Shouting (excessive capitalization) filter
//!
//! Triggers only when the content is long enough to judge and the
//! uppercase ratio among letters exceeds the threshold.

use super::Filter;
use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;

/// Content shorter than this is never judged for shouting.
const MIN_LENGTH: usize = 10;
/// Uppercase ratio among alphabetic characters above which the filter trips.
const CAPS_RATIO: f32 = 0.7;

pub struct ShoutingFilter;

impl ShoutingFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShoutingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for ShoutingFilter {
    fn name(&self) -> &'static str {
        "shouting"
    }

    fn severity(&self) -> u8 {
        2
    }

    fn suggested_action(&self) -> ActionClass {
        ActionClass::Warn
    }

    fn check(&self, event: &Event, _config: &CommunityConfig) -> bool {
        if event.content.chars().count() < MIN_LENGTH {
            return false;
        }

        let alpha: Vec<char> = event.content.chars().filter(|c| c.is_alphabetic()).collect();
        if alpha.is_empty() {
            return false;
        }

        let caps = alpha.iter().filter(|c| c.is_uppercase()).count();
        caps as f32 / alpha.len() as f32 > CAPS_RATIO
    }
}
