//! Repeated-combining-character ("zalgo") filter
//!
//! Heavily stacked Unicode combining marks render as unreadable glitch
//! text. Triggers when the count of combining-mark codepoints exceeds the
//! threshold.

use super::Filter;
use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;

/// Combining-mark codepoints allowed before the filter trips.
const MAX_COMBINING_MARKS: usize = 10;

/// Unicode combining-mark blocks.
fn is_combining_mark(c: char) -> bool {
    let code = c as u32;
    (0x0300..=0x036F).contains(&code)        // Combining Diacritical Marks
        || (0x1AB0..=0x1AFF).contains(&code) // Combining Diacritical Marks Extended
        || (0x1DC0..=0x1DFF).contains(&code) // Combining Diacritical Marks Supplement
        || (0x20D0..=0x20FF).contains(&code) // Combining Marks for Symbols
        || (0xFE20..=0xFE2F).contains(&code) // Combining Half Marks
}

pub struct ZalgoFilter;

impl ZalgoFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZalgoFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for ZalgoFilter {
    fn name(&self) -> &'static str {
        "zalgo"
    }

    fn severity(&self) -> u8 {
        4
    }

    fn suggested_action(&self) -> ActionClass {
        ActionClass::Warn
    }

    fn check(&self, event: &Event, _config: &CommunityConfig) -> bool {
        event
            .content
            .chars()
            .filter(|c| is_combining_mark(*c))
            .count()
            > MAX_COMBINING_MARKS
    }
}
