//! Case/appeal storage seam
//!
//! The persistent store is an external collaborator; the engine only
//! depends on this trait. `MemoryCaseStore` is the bundled reference
//! implementation, suitable for single-instance deployments and tests.
//! For durable multi-instance storage, implement the trait over your
//! database and hand it to the ledger.
//!
//! `replace_*` methods are optimistic: they compare a caller-supplied
//! expectation against the stored row and fail with
//! [`EnforcementError::Conflict`] on mismatch, so racing read-modify-write
//! sequences cannot lose updates.

use crate::appeals::{Appeal, AppealStatus};
use crate::cases::Case;
use crate::error::EnforcementError;
use crate::{CommunityId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Insert a freshly created case. Case ids are generated to be
    /// practically unique; a collision is a persistence fault.
    async fn insert_case(&self, case: Case) -> Result<(), EnforcementError>;

    async fn fetch_case(&self, case_id: &str) -> Result<Option<Case>, EnforcementError>;

    /// Community-scoped lookup; cheaper than the cross-community scan in
    /// indexed backends.
    async fn fetch_case_scoped(
        &self,
        case_id: &str,
        community: CommunityId,
    ) -> Result<Option<Case>, EnforcementError>;

    /// Replace a case if its stored `updated_at` still matches
    /// `expected_updated_at`.
    async fn replace_case(
        &self,
        expected_updated_at: DateTime<Utc>,
        case: Case,
    ) -> Result<(), EnforcementError>;

    async fn cases_for_user(
        &self,
        user: UserId,
        community: CommunityId,
    ) -> Result<Vec<Case>, EnforcementError>;

    async fn cases_for_community(
        &self,
        community: CommunityId,
    ) -> Result<Vec<Case>, EnforcementError>;

    /// Delete terminal cases (and their appeals) last updated before the
    /// cutoff. Returns the number of cases removed.
    async fn purge_terminal(
        &self,
        community: CommunityId,
        older_than: DateTime<Utc>,
    ) -> Result<u64, EnforcementError>;

    /// Insert an appeal, enforcing at most one per case.
    async fn insert_appeal(&self, appeal: Appeal) -> Result<(), EnforcementError>;

    async fn fetch_appeal(&self, case_id: &str) -> Result<Option<Appeal>, EnforcementError>;

    /// Replace an appeal if its stored status still matches
    /// `expected_status`.
    async fn replace_appeal(
        &self,
        expected_status: AppealStatus,
        appeal: Appeal,
    ) -> Result<(), EnforcementError>;
}

/// In-memory store backed by concurrent maps. Cases are keyed by case id;
/// appeals are keyed by case id with at most one per case.
pub struct MemoryCaseStore {
    cases: DashMap<String, Case>,
    appeals: DashMap<String, Appeal>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self {
            cases: DashMap::new(),
            appeals: DashMap::new(),
        }
    }
}

impl Default for MemoryCaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn insert_case(&self, case: Case) -> Result<(), EnforcementError> {
        let case_id = case.case_id.clone();
        match self.cases.entry(case_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(EnforcementError::Persistence(
                format!("duplicate case id {}", case_id),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(case);
                Ok(())
            }
        }
    }

    async fn fetch_case(&self, case_id: &str) -> Result<Option<Case>, EnforcementError> {
        Ok(self.cases.get(case_id).map(|c| c.clone()))
    }

    async fn fetch_case_scoped(
        &self,
        case_id: &str,
        community: CommunityId,
    ) -> Result<Option<Case>, EnforcementError> {
        Ok(self
            .cases
            .get(case_id)
            .filter(|c| c.community_id == community)
            .map(|c| c.clone()))
    }

    async fn replace_case(
        &self,
        expected_updated_at: DateTime<Utc>,
        case: Case,
    ) -> Result<(), EnforcementError> {
        // get_mut holds the shard lock for the compare-and-swap.
        let mut stored = self
            .cases
            .get_mut(&case.case_id)
            .ok_or_else(|| EnforcementError::CaseNotFound(case.case_id.clone()))?;

        if stored.updated_at != expected_updated_at {
            return Err(EnforcementError::Conflict(case.case_id.clone()));
        }
        *stored = case;
        Ok(())
    }

    async fn cases_for_user(
        &self,
        user: UserId,
        community: CommunityId,
    ) -> Result<Vec<Case>, EnforcementError> {
        Ok(self
            .cases
            .iter()
            .filter(|c| c.subject_id == user && c.community_id == community)
            .map(|c| c.clone())
            .collect())
    }

    async fn cases_for_community(
        &self,
        community: CommunityId,
    ) -> Result<Vec<Case>, EnforcementError> {
        Ok(self
            .cases
            .iter()
            .filter(|c| c.community_id == community)
            .map(|c| c.clone())
            .collect())
    }

    async fn purge_terminal(
        &self,
        community: CommunityId,
        older_than: DateTime<Utc>,
    ) -> Result<u64, EnforcementError> {
        let doomed: Vec<String> = self
            .cases
            .iter()
            .filter(|c| {
                c.community_id == community
                    && c.status.is_terminal()
                    && c.updated_at < older_than
            })
            .map(|c| c.case_id.clone())
            .collect();

        for case_id in &doomed {
            self.cases.remove(case_id);
            self.appeals.remove(case_id);
        }
        Ok(doomed.len() as u64)
    }

    async fn insert_appeal(&self, appeal: Appeal) -> Result<(), EnforcementError> {
        let case_id = appeal.case_id.clone();
        match self.appeals.entry(case_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(EnforcementError::AlreadyAppealed(case_id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(appeal);
                Ok(())
            }
        }
    }

    async fn fetch_appeal(&self, case_id: &str) -> Result<Option<Appeal>, EnforcementError> {
        Ok(self.appeals.get(case_id).map(|a| a.clone()))
    }

    async fn replace_appeal(
        &self,
        expected_status: AppealStatus,
        appeal: Appeal,
    ) -> Result<(), EnforcementError> {
        let mut stored = self
            .appeals
            .get_mut(&appeal.case_id)
            .ok_or_else(|| EnforcementError::AppealNotFound(appeal.case_id.clone()))?;

        if stored.status != expected_status {
            return Err(EnforcementError::Conflict(appeal.case_id.clone()));
        }
        *stored = appeal;
        Ok(())
    }
}
