//! Content filter set
//!
//! Independent predicates that each answer "does this event violate
//! policy Y?" with a fixed severity and a suggested action class. Filters
//! are side-effect-free with respect to persisted state; the burst filter
//! intentionally holds a short-lived in-memory timestamp window per user.
//!
//! The orchestrator collects *all* triggered results, not just the first,
//! because severity aggregation depends on having the full set.

mod burst;
mod keyword;
mod link;
mod shouting;
mod zalgo;

pub use burst::BurstFilter;
pub use keyword::KeywordFilter;
pub use link::LinkFilter;
pub use shouting::ShoutingFilter;
pub use zalgo::ZalgoFilter;

use crate::config::CommunityConfig;
use crate::escalation::ActionClass;
use crate::event::Event;
use serde::Serialize;

/// One content policy dimension.
pub trait Filter: Send + Sync {
    /// Stable filter name used in case reasons and mod-log entries.
    fn name(&self) -> &'static str;

    /// Fixed severity on a 0-10 scale.
    fn severity(&self) -> u8;

    /// Advisory action class; the escalation policy has the final say.
    fn suggested_action(&self) -> ActionClass;

    /// Does this event violate the policy?
    fn check(&self, event: &Event, config: &CommunityConfig) -> bool;
}

/// A triggered filter, recorded per event.
#[derive(Debug, Clone, Serialize)]
pub struct FilterHit {
    pub name: &'static str,
    pub severity: u8,
    pub suggested: ActionClass,
}

/// The full set of filters run against every moderated event.
pub struct FilterSet {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterSet {
    /// Empty set; mostly useful for tests that exercise specific filters.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The standard filter roster. Declaration order is the tie-break for
    /// equal severities.
    pub fn standard() -> Self {
        Self::new()
            .with(KeywordFilter::new())
            .with(BurstFilter::new())
            .with(ZalgoFilter::new())
            .with(LinkFilter::new())
            .with(ShoutingFilter::new())
    }

    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run every filter and collect the triggered results, ordered by
    /// severity descending. The sort is stable, so equal severities keep
    /// declaration order.
    pub fn run(&self, event: &Event, config: &CommunityConfig) -> Vec<FilterHit> {
        let mut hits: Vec<FilterHit> = self
            .filters
            .iter()
            .filter(|f| f.check(event, config))
            .map(|f| FilterHit {
                name: f.name(),
                severity: f.severity(),
                suggested: f.suggested_action(),
            })
            .collect();

        hits.sort_by(|a, b| b.severity.cmp(&a.severity));
        hits
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::standard()
    }
}
