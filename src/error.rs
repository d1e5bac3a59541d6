//! Error taxonomy for enforcement, ledger and appeal operations
//!
//! Business-rule violations (`NotAppealable`, `AlreadyAppealed`,
//! `AlreadyReviewed`, ...) are reported to the caller and never mutate
//! state. Platform-side failures are deliberately *not* part of this enum:
//! the collaborator traits return `anyhow::Error` and the orchestrator
//! logs those without rolling back the enforcement record.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnforcementError {
    /// Malformed input, e.g. an empty appeal rationale or an appeal
    /// submitted by someone other than the case subject.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("case {0} not found")]
    CaseNotFound(String),

    /// The case was created with `appealable = false`.
    #[error("case {0} cannot be appealed")]
    NotAppealable(String),

    /// The case already carries an appeal.
    #[error("case {0} has already been appealed")]
    AlreadyAppealed(String),

    #[error("no appeal exists for case {0}")]
    AppealNotFound(String),

    /// The appeal is no longer pending. Also surfaced to the losing
    /// caller when two reviewers race to decide the same appeal.
    #[error("appeal for case {0} has already been reviewed")]
    AlreadyReviewed(String),

    /// Reopen requested on an appeal that was never decided.
    #[error("appeal for case {0} is still pending")]
    AppealStillPending(String),

    #[error("invalid case status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Optimistic concurrency check failed on a read-modify-write.
    /// Internal; mapped to a business-rule error at the call site.
    #[error("concurrent modification of {0}")]
    Conflict(String),

    /// Store unavailable. Fatal for the triggering operation; the engine
    /// does not retry automatically to avoid duplicate escalation.
    #[error("persistence failure: {0}")]
    Persistence(String),
}
