//! Deny-list keyword filter
//!
//! Case-insensitive substring match against the community's configured
//! deny-list. No stemming or NLP; this intentionally preserves the
//! simplicity of a static word list.

use super::Filter;
use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;

pub struct KeywordFilter;

impl KeywordFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for KeywordFilter {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn severity(&self) -> u8 {
        7
    }

    fn suggested_action(&self) -> ActionClass {
        ActionClass::Timeout
    }

    fn check(&self, event: &Event, config: &CommunityConfig) -> bool {
        if config.deny_list.is_empty() {
            return false;
        }

        let content = event.content.to_lowercase();
        config
            .deny_list
            .iter()
            .filter(|word| !word.is_empty())
            .any(|word| content.contains(&word.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(words: &[&str]) -> CommunityConfig {
        CommunityConfig {
            deny_list: words.iter().map(|w| w.to_string()).collect(),
            ..Default::default()
        }
    }

    fn event(content: &str) -> Event {
        Event::now("m1", 10, 1, 5, content)
    }

    #[test]
    fn test_case_insensitive_match() {
        let filter = KeywordFilter::new();
        let config = config_with(&["Slur"]);
        assert!(filter.check(&event("what a SLUR that was"), &config));
    }

    #[test]
    fn test_substring_match() {
        let filter = KeywordFilter::new();
        let config = config_with(&["spam"]);
        assert!(filter.check(&event("unspammable"), &config));
    }

    #[test]
    fn test_no_match() {
        let filter = KeywordFilter::new();
        let config = config_with(&["spam"]);
        assert!(!filter.check(&event("perfectly fine message"), &config));
    }

    #[test]
    fn test_empty_deny_list_never_triggers() {
        let filter = KeywordFilter::new();
        let config = config_with(&[]);
        assert!(!filter.check(&event("anything at all"), &config));
    }
}
