//! Appeal workflow
//!
//! State machine layered on the case ledger letting a sanctioned user
//! contest a case and a reviewer approve or deny it:
//!
//! ```text
//! pending -> {approved, denied}
//! approved/denied -> pending    (privileged reopen)
//! ```
//!
//! One appeal per case; reopening a decided appeal is a reviewer action
//! on the existing record, never a new submission. Every reviewer
//! transition stamps `reviewed_by`, `review_note` and `reviewed_at`.

use crate::cases::{CaseLedger, CaseStatus};
use crate::error::EnforcementError;
use crate::store::CaseStore;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    Pending,
    Approved,
    Denied,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::Pending => "pending",
            AppealStatus::Approved => "approved",
            AppealStatus::Denied => "denied",
        }
    }
}

impl std::fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer decision on a pending appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppealVerdict {
    Approved,
    Denied,
}

impl AppealVerdict {
    fn appeal_status(self) -> AppealStatus {
        match self {
            AppealVerdict::Approved => AppealStatus::Approved,
            AppealVerdict::Denied => AppealStatus::Denied,
        }
    }

    fn case_status(self) -> CaseStatus {
        match self {
            AppealVerdict::Approved => CaseStatus::Approved,
            AppealVerdict::Denied => CaseStatus::Denied,
        }
    }
}

/// One appeal, keyed to its case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appeal {
    pub case_id: String,
    pub submitted_by: UserId,
    pub rationale: String,
    pub evidence: Option<String>,
    /// Preferred contact for the review outcome.
    pub contact: Option<String>,
    pub status: AppealStatus,
    pub reviewed_by: Option<UserId>,
    pub review_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Appeal submission input.
#[derive(Debug, Clone)]
pub struct SubmitAppeal {
    pub case_id: String,
    pub rationale: String,
    pub evidence: Option<String>,
    pub contact: Option<String>,
}

/// Appeal operations over the shared case store.
#[derive(Clone)]
pub struct AppealWorkflow {
    store: Arc<dyn CaseStore>,
    ledger: CaseLedger,
}

impl AppealWorkflow {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self {
            ledger: CaseLedger::new(store.clone()),
            store,
        }
    }

    /// Can this user still appeal this case? False for foreign cases,
    /// non-appealable cases, and cases already appealed.
    pub async fn can_user_appeal(
        &self,
        case_id: &str,
        user: UserId,
    ) -> Result<bool, EnforcementError> {
        let case = match self.ledger.get_case(case_id, None).await? {
            Some(case) => case,
            None => return Ok(false),
        };
        if case.subject_id != user || !case.appealable || case.appealed {
            return Ok(false);
        }
        Ok(self.store.fetch_appeal(case_id).await?.is_none())
    }

    /// Submit an appeal. Fails `NotAppealable` / `AlreadyAppealed` per
    /// the ledger rules; validation failures leave no state behind.
    pub async fn submit(
        &self,
        input: SubmitAppeal,
        user: UserId,
    ) -> Result<Appeal, EnforcementError> {
        if input.rationale.trim().is_empty() {
            return Err(EnforcementError::Validation(
                "appeal rationale must not be empty".to_string(),
            ));
        }

        let case = self
            .ledger
            .get_case(&input.case_id, None)
            .await?
            .ok_or_else(|| EnforcementError::CaseNotFound(input.case_id.clone()))?;
        if case.subject_id != user {
            return Err(EnforcementError::Validation(format!(
                "user {} is not the subject of case {}",
                user, input.case_id
            )));
        }

        // Case-side transition first; it owns the NotAppealable /
        // AlreadyAppealed rules.
        self.ledger
            .appeal(&input.case_id, &input.rationale, user)
            .await?;

        let appeal = Appeal {
            case_id: input.case_id.clone(),
            submitted_by: user,
            rationale: input.rationale,
            evidence: input.evidence,
            contact: input.contact,
            status: AppealStatus::Pending,
            reviewed_by: None,
            review_note: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
        };
        self.store.insert_appeal(appeal.clone()).await?;

        log::info!("Appeal submitted for case {} by user {}", appeal.case_id, user);
        Ok(appeal)
    }

    pub async fn get_appeal(&self, case_id: &str) -> Result<Option<Appeal>, EnforcementError> {
        self.store.fetch_appeal(case_id).await
    }

    /// Decide a pending appeal. The losing racer of two concurrent
    /// reviews sees `AlreadyReviewed`; the case moves to the matching
    /// terminal status.
    pub async fn review(
        &self,
        case_id: &str,
        verdict: AppealVerdict,
        reviewer: UserId,
        note: impl Into<String>,
    ) -> Result<Appeal, EnforcementError> {
        let mut appeal = self
            .store
            .fetch_appeal(case_id)
            .await?
            .ok_or_else(|| EnforcementError::AppealNotFound(case_id.to_string()))?;

        if appeal.status != AppealStatus::Pending {
            return Err(EnforcementError::AlreadyReviewed(case_id.to_string()));
        }

        appeal.status = verdict.appeal_status();
        appeal.reviewed_by = Some(reviewer);
        appeal.review_note = Some(note.into());
        appeal.reviewed_at = Some(Utc::now());

        match self
            .store
            .replace_appeal(AppealStatus::Pending, appeal.clone())
            .await
        {
            Ok(()) => {}
            Err(EnforcementError::Conflict(_)) => {
                return Err(EnforcementError::AlreadyReviewed(case_id.to_string()))
            }
            Err(e) => return Err(e),
        }

        self.ledger
            .update_status(case_id, verdict.case_status(), Some(reviewer))
            .await?;

        log::info!(
            "Appeal for case {} {} by reviewer {}",
            case_id,
            appeal.status,
            reviewer
        );
        Ok(appeal)
    }

    /// Privileged correction: return a decided appeal to pending and its
    /// case to appealed, on the existing appeal record.
    pub async fn reopen(
        &self,
        case_id: &str,
        reviewer: UserId,
        note: impl Into<String>,
    ) -> Result<Appeal, EnforcementError> {
        let mut appeal = self
            .store
            .fetch_appeal(case_id)
            .await?
            .ok_or_else(|| EnforcementError::AppealNotFound(case_id.to_string()))?;

        if appeal.status == AppealStatus::Pending {
            return Err(EnforcementError::AppealStillPending(case_id.to_string()));
        }

        let previous = appeal.status;
        appeal.status = AppealStatus::Pending;
        appeal.reviewed_by = Some(reviewer);
        appeal.review_note = Some(note.into());
        appeal.reviewed_at = Some(Utc::now());

        match self.store.replace_appeal(previous, appeal.clone()).await {
            Ok(()) => {}
            Err(EnforcementError::Conflict(_)) => {
                // Someone already moved it; reopening a pending appeal is
                // meaningless, report it as such.
                return Err(EnforcementError::AppealStillPending(case_id.to_string()));
            }
            Err(e) => return Err(e),
        }

        self.ledger
            .update_status(case_id, CaseStatus::Appealed, Some(reviewer))
            .await?;

        log::info!("Appeal for case {} reopened by reviewer {}", case_id, reviewer);
        Ok(appeal)
    }
}
