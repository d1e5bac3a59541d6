//! gavel - automated moderation enforcement engine
//!
//! Inspects user-generated events in a shared community space, classifies
//! them against independent content filters, accumulates per-user warning
//! state with time decay, escalates to punitive actions according to
//! configurable thresholds, and records every enforcement decision as an
//! immutable, appealable case.
//!
//! The chat platform (event delivery, mute/ban/kick execution), the
//! persistent store, and the notification channel are external
//! collaborators reached through the traits in [`platform`] and [`store`].

pub mod appeals;
pub mod cases;
pub mod config;
pub mod error;
pub mod escalation;
pub mod event;
pub mod filters;
pub mod orchestrator;
pub mod platform;
pub mod store;
pub mod warnings;

/// Platform user identifier (snowflake-style).
pub type UserId = u64;
/// Community ("guild"/server) identifier. Warning counts, cases and
/// configuration are all scoped to one community.
pub type CommunityId = u64;
/// Channel identifier within a community.
pub type ChannelId = u64;

/// Issuer identity recorded on cases created by the engine itself rather
/// than a human operator.
pub const SYSTEM_ISSUER: UserId = 0;

pub use error::EnforcementError;
pub use event::Event;
pub use orchestrator::AutomodEngine;
