//! Enforcement case ledger
//!
//! Append-only record of every enforcement decision, automated or manual.
//! Cases are never hard-deleted outside the explicit age-bounded purge;
//! "deletion" is a status transition to a terminal state.
//!
//! Status lifecycle is one explicit transition table rather than a set of
//! independent boolean flags:
//!
//! ```text
//! Active -> Appealed -> {Approved, Denied}
//! Active -> Closed
//! Approved/Denied -> Appealed   (privileged reopen only)
//! ```

use crate::error::EnforcementError;
use crate::escalation::ActionClass;
use crate::store::CaseStore;
use crate::{CommunityId, UserId};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Closed set of case kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Warn,
    Timeout,
    Kick,
    Ban,
    Unban,
    Untimeout,
    Note,
    Strike,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Warn => "warn",
            CaseType::Timeout => "timeout",
            CaseType::Kick => "kick",
            CaseType::Ban => "ban",
            CaseType::Unban => "unban",
            CaseType::Untimeout => "untimeout",
            CaseType::Note => "note",
            CaseType::Strike => "strike",
        }
    }
}

impl From<ActionClass> for CaseType {
    fn from(action: ActionClass) -> Self {
        match action {
            ActionClass::Warn => CaseType::Warn,
            ActionClass::Timeout => CaseType::Timeout,
            ActionClass::Ban => CaseType::Ban,
        }
    }
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case lifecycle state. Terminal states: `Approved`, `Denied`, `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Active,
    Appealed,
    Approved,
    Denied,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Active => "active",
            CaseStatus::Appealed => "appealed",
            CaseStatus::Approved => "approved",
            CaseStatus::Denied => "denied",
            CaseStatus::Closed => "closed",
        }
    }

    /// The lifecycle transition table. Reopening a decided appeal moves
    /// the case back to `Appealed`; that path is reserved for reviewers.
    pub fn can_transition(self, to: CaseStatus) -> bool {
        matches!(
            (self, to),
            (CaseStatus::Active, CaseStatus::Appealed)
                | (CaseStatus::Active, CaseStatus::Closed)
                | (CaseStatus::Appealed, CaseStatus::Approved)
                | (CaseStatus::Appealed, CaseStatus::Denied)
                | (CaseStatus::Approved, CaseStatus::Appealed)
                | (CaseStatus::Denied, CaseStatus::Appealed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CaseStatus::Approved | CaseStatus::Denied | CaseStatus::Closed
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text note appended to a case's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNote {
    pub author_id: UserId,
    pub body: String,
    pub at: DateTime<Utc>,
}

/// One enforcement decision. Identity and decision fields are immutable;
/// only status, appeal markers, notes and `updated_at` change after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub kind: CaseType,
    pub subject_id: UserId,
    /// `SYSTEM_ISSUER` when automated, otherwise the acting operator.
    pub issuer_id: UserId,
    pub community_id: CommunityId,
    pub reason: String,
    pub status: CaseStatus,
    pub appealable: bool,
    pub appealed: bool,
    /// Set only for time-bound sanctions.
    pub duration_secs: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Vec<CaseNote>,
}

/// Input for creating a case.
#[derive(Debug, Clone)]
pub struct CaseInput {
    pub kind: CaseType,
    pub subject_id: UserId,
    pub issuer_id: UserId,
    pub community_id: CommunityId,
    pub reason: String,
    /// Defaults to true when unset.
    pub appealable: Option<bool>,
    pub duration_secs: Option<u64>,
}

/// Per-community case counts for the reporting surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_kind: BTreeMap<String, u64>,
}

/// Globally unique case identifier: community short-id, millisecond
/// timestamp in hex, random alphanumeric suffix. The random suffix keeps
/// ids unique even when two cases land on the same millisecond.
fn generate_case_id(community: CommunityId) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "{:04}-{:x}-{}",
        community % 10_000,
        Utc::now().timestamp_millis(),
        suffix
    )
}

/// Business rules over the case collection. Persistence goes through the
/// [`CaseStore`] trait so a durable backend can replace the in-memory one
/// without touching ledger logic.
#[derive(Clone)]
pub struct CaseLedger {
    store: Arc<dyn CaseStore>,
}

impl CaseLedger {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn CaseStore> {
        self.store.clone()
    }

    /// Create and persist a new case. Status starts `Active`; appealable
    /// defaults to true.
    pub async fn create_case(&self, input: CaseInput) -> Result<Case, EnforcementError> {
        let now = Utc::now();
        let case = Case {
            case_id: generate_case_id(input.community_id),
            kind: input.kind,
            subject_id: input.subject_id,
            issuer_id: input.issuer_id,
            community_id: input.community_id,
            reason: input.reason,
            status: CaseStatus::Active,
            appealable: input.appealable.unwrap_or(true),
            appealed: false,
            duration_secs: input.duration_secs,
            created_at: now,
            updated_at: now,
            notes: Vec::new(),
        };

        self.store.insert_case(case.clone()).await?;
        log::info!(
            "Case {} created: {} against user {} in community {}",
            case.case_id,
            case.kind,
            case.subject_id,
            case.community_id
        );
        Ok(case)
    }

    /// Look up a case. Pass the community when known; the unscoped path
    /// is a more expensive cross-community scan.
    pub async fn get_case(
        &self,
        case_id: &str,
        community: Option<CommunityId>,
    ) -> Result<Option<Case>, EnforcementError> {
        match community {
            Some(community) => self.store.fetch_case_scoped(case_id, community).await,
            None => self.store.fetch_case(case_id).await,
        }
    }

    /// All cases against one user in one community, newest first.
    pub async fn get_user_cases(
        &self,
        user: UserId,
        community: CommunityId,
    ) -> Result<Vec<Case>, EnforcementError> {
        let mut cases = self.store.cases_for_user(user, community).await?;
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    /// Transition a case's status, appending an audit note when an actor
    /// is supplied. Validates against the transition table.
    pub async fn update_status(
        &self,
        case_id: &str,
        new_status: CaseStatus,
        actor: Option<UserId>,
    ) -> Result<Case, EnforcementError> {
        let mut case = self
            .store
            .fetch_case(case_id)
            .await?
            .ok_or_else(|| EnforcementError::CaseNotFound(case_id.to_string()))?;

        if !case.status.can_transition(new_status) {
            return Err(EnforcementError::InvalidTransition {
                from: case.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let expected = case.updated_at;
        if let Some(actor) = actor {
            case.notes.push(CaseNote {
                author_id: actor,
                body: format!("status changed from {} to {}", case.status, new_status),
                at: Utc::now(),
            });
        }
        case.status = new_status;
        case.updated_at = Utc::now();

        self.store.replace_case(expected, case.clone()).await?;
        Ok(case)
    }

    /// Append a free-text note to a case's audit trail.
    pub async fn add_note(
        &self,
        case_id: &str,
        author: UserId,
        body: impl Into<String>,
    ) -> Result<Case, EnforcementError> {
        let mut case = self
            .store
            .fetch_case(case_id)
            .await?
            .ok_or_else(|| EnforcementError::CaseNotFound(case_id.to_string()))?;

        let expected = case.updated_at;
        case.notes.push(CaseNote {
            author_id: author,
            body: body.into(),
            at: Utc::now(),
        });
        case.updated_at = Utc::now();

        self.store.replace_case(expected, case.clone()).await?;
        Ok(case)
    }

    /// Mark a case as appealed. Fails `NotAppealable` / `AlreadyAppealed`
    /// without any state change.
    pub async fn appeal(
        &self,
        case_id: &str,
        reason: &str,
        appellant: UserId,
    ) -> Result<Case, EnforcementError> {
        let mut case = self
            .store
            .fetch_case(case_id)
            .await?
            .ok_or_else(|| EnforcementError::CaseNotFound(case_id.to_string()))?;

        if !case.appealable {
            return Err(EnforcementError::NotAppealable(case_id.to_string()));
        }
        if case.appealed {
            return Err(EnforcementError::AlreadyAppealed(case_id.to_string()));
        }
        if !case.status.can_transition(CaseStatus::Appealed) {
            return Err(EnforcementError::InvalidTransition {
                from: case.status.to_string(),
                to: CaseStatus::Appealed.to_string(),
            });
        }

        let expected = case.updated_at;
        case.appealed = true;
        case.status = CaseStatus::Appealed;
        case.notes.push(CaseNote {
            author_id: appellant,
            body: format!("appeal submitted: {}", reason),
            at: Utc::now(),
        });
        case.updated_at = Utc::now();

        // A racing appeal on the same case is the only plausible writer
        // here, so a conflict reads as "someone appealed first".
        match self.store.replace_case(expected, case.clone()).await {
            Ok(()) => Ok(case),
            Err(EnforcementError::Conflict(_)) => {
                Err(EnforcementError::AlreadyAppealed(case_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Case counts for one community.
    pub async fn case_stats(&self, community: CommunityId) -> Result<CaseStats, EnforcementError> {
        let cases = self.store.cases_for_community(community).await?;
        let mut stats = CaseStats {
            total: cases.len() as u64,
            ..Default::default()
        };
        for case in &cases {
            *stats
                .by_status
                .entry(case.status.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_kind
                .entry(case.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// Physically delete terminal cases older than the cutoff. The only
    /// hard-deletion path; everything else is a status transition.
    pub async fn purge_closed(
        &self,
        community: CommunityId,
        older_than: DateTime<Utc>,
    ) -> Result<u64, EnforcementError> {
        let purged = self.store.purge_terminal(community, older_than).await?;
        if purged > 0 {
            log::info!(
                "Purged {} terminal cases from community {}",
                purged,
                community
            );
        }
        Ok(purged)
    }
}
