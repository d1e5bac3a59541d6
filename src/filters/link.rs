//! Link filter
//!
//! Triggers on the presence of any http(s) URL.

use super::Filter;
use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s\])<>]+").expect("Invalid URL regex"));

pub struct LinkFilter;

impl LinkFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LinkFilter {
    fn name(&self) -> &'static str {
        "link"
    }

    fn severity(&self) -> u8 {
        3
    }

    fn suggested_action(&self) -> ActionClass {
        ActionClass::Warn
    }

    fn check(&self, event: &Event, _config: &CommunityConfig) -> bool {
        URL_REGEX.is_match(&event.content)
    }
}
