//! Case ledger tests: creation, lookup scoping, status transitions,
//! notes, stats and the age-bounded purge.

mod common;

use chrono::{Duration, Utc};
use common::*;
use gavel::cases::{CaseInput, CaseStatus, CaseType};
use gavel::EnforcementError;

const COMMUNITY: u64 = 42;
const SUBJECT: u64 = 1001;
const OPERATOR: u64 = 2002;

fn manual_case(kind: CaseType) -> CaseInput {
    CaseInput {
        kind,
        subject_id: SUBJECT,
        issuer_id: OPERATOR,
        community_id: COMMUNITY,
        reason: "manual action".to_string(),
        appealable: None,
        duration_secs: None,
    }
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let h = harness();
    let created = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Ban))
        .await
        .unwrap();

    // Defaults.
    assert_eq!(created.status, CaseStatus::Active);
    assert!(created.appealable, "appealable defaults to true");
    assert!(!created.appealed);
    assert!(created.notes.is_empty());

    let fetched = h
        .engine
        .ledger()
        .get_case(&created.case_id, Some(COMMUNITY))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_scoped_lookup_requires_matching_community() {
    let h = harness();
    let created = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Warn))
        .await
        .unwrap();

    assert!(h
        .engine
        .ledger()
        .get_case(&created.case_id, Some(999))
        .await
        .unwrap()
        .is_none());

    // Cross-community scan still finds it.
    assert!(h
        .engine
        .ledger()
        .get_case(&created.case_id, None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_user_cases_newest_first() {
    let h = harness();
    let first = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Warn))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Note))
        .await
        .unwrap();

    let cases = h
        .engine
        .ledger()
        .get_user_cases(SUBJECT, COMMUNITY)
        .await
        .unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].case_id, second.case_id);
    assert_eq!(cases[1].case_id, first.case_id);
}

#[tokio::test]
async fn test_update_status_appends_audit_note() {
    let h = harness();
    let created = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Warn))
        .await
        .unwrap();

    let closed = h
        .engine
        .ledger()
        .update_status(&created.case_id, CaseStatus::Closed, Some(OPERATOR))
        .await
        .unwrap();
    assert_eq!(closed.status, CaseStatus::Closed);
    assert_eq!(closed.notes.len(), 1);
    assert_eq!(closed.notes[0].author_id, OPERATOR);
    assert!(closed.notes[0].body.contains("active"));
    assert!(closed.notes[0].body.contains("closed"));
}

#[tokio::test]
async fn test_invalid_transition_rejected() {
    let h = harness();
    let created = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Warn))
        .await
        .unwrap();

    // Active -> Approved skips the appeal entirely.
    let err = h
        .engine
        .ledger()
        .update_status(&created.case_id, CaseStatus::Approved, Some(OPERATOR))
        .await
        .unwrap_err();
    assert!(matches!(err, EnforcementError::InvalidTransition { .. }));

    // Unchanged.
    let case = h
        .engine
        .ledger()
        .get_case(&created.case_id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(case.status, CaseStatus::Active);
}

#[tokio::test]
async fn test_update_status_on_missing_case() {
    let h = harness();
    let err = h
        .engine
        .ledger()
        .update_status("0001-0-nope", CaseStatus::Closed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EnforcementError::CaseNotFound(_)));
}

#[tokio::test]
async fn test_add_note() {
    let h = harness();
    let created = h
        .engine
        .ledger()
        .create_case(manual_case(CaseType::Strike))
        .await
        .unwrap();

    let with_note = h
        .engine
        .ledger()
        .add_note(&created.case_id, OPERATOR, "spoke to the user")
        .await
        .unwrap();
    assert_eq!(with_note.notes.len(), 1);
    assert_eq!(with_note.notes[0].body, "spoke to the user");
}

#[tokio::test]
async fn test_case_stats() {
    let h = harness();
    let ledger = h.engine.ledger();

    ledger.create_case(manual_case(CaseType::Warn)).await.unwrap();
    ledger.create_case(manual_case(CaseType::Warn)).await.unwrap();
    let closed = ledger.create_case(manual_case(CaseType::Ban)).await.unwrap();
    ledger
        .update_status(&closed.case_id, CaseStatus::Closed, None)
        .await
        .unwrap();

    let stats = ledger.case_stats(COMMUNITY).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status.get("active"), Some(&2));
    assert_eq!(stats.by_status.get("closed"), Some(&1));
    assert_eq!(stats.by_kind.get("warn"), Some(&2));
    assert_eq!(stats.by_kind.get("ban"), Some(&1));

    // Other communities are empty.
    let empty = ledger.case_stats(999).await.unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn test_purge_is_bounded_by_age_and_state() {
    let h = harness();
    let ledger = h.engine.ledger();

    let active = ledger.create_case(manual_case(CaseType::Warn)).await.unwrap();
    let closed = ledger.create_case(manual_case(CaseType::Warn)).await.unwrap();
    ledger
        .update_status(&closed.case_id, CaseStatus::Closed, None)
        .await
        .unwrap();

    // Cutoff in the past: the just-closed case is too recent to purge.
    let purged = ledger
        .purge_closed(COMMUNITY, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(purged, 0);

    // Cutoff in the future: terminal cases go, active ones stay.
    let purged = ledger
        .purge_closed(COMMUNITY, Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert!(ledger.get_case(&closed.case_id, None).await.unwrap().is_none());
    assert!(ledger.get_case(&active.case_id, None).await.unwrap().is_some());
}
