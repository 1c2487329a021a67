//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use dueproc::api::{
    BusinessDaysRequest, BusinessDaysResponse, ContextParams, EvaluateRequest, HealthResponse,
    TriageEntry, TriageRequest, TriageResponse,
};
use dueproc_core::{
    AlertBucket, AlertSeverity, CaseAlert, CaseId, CompletionStatus, Regime, SlaSpec, StageNumber,
};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// CONTEXT PARAMS TESTS
// =============================================================================

#[test]
fn test_context_params_empty() {
    let params: ContextParams = serde_json::from_str("{}").unwrap();
    assert_eq!(params.parse_regime().unwrap(), None);
    assert_eq!(params.parse_today().unwrap(), None);
}

#[test]
fn test_context_params_parsed() {
    let params: ContextParams =
        serde_json::from_str(r#"{"today":"2026-10-19","regime":"Trimestral"}"#).unwrap();
    assert_eq!(params.parse_regime().unwrap(), Some(Regime::Trimestral));
    assert_eq!(
        params.parse_today().unwrap(),
        chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
    );
}

#[test]
fn test_context_params_bad_date() {
    let params = ContextParams {
        today: Some("tomorrow".to_string()),
        regime: None,
    };
    assert!(params.parse_today().is_err());
}

// =============================================================================
// BUSINESS DAYS TESTS
// =============================================================================

#[test]
fn test_business_days_request_regime_optional() {
    let request: BusinessDaysRequest =
        serde_json::from_str(r#"{"from":"2026-10-02","to":"2026-10-19"}"#).unwrap();
    assert_eq!(request.from, "2026-10-02");
    assert!(request.regime.is_none());
}

#[test]
fn test_business_days_response_shapes() {
    let ok = serde_json::to_value(BusinessDaysResponse::success(-3, Regime::Semestral)).unwrap();
    assert_eq!(ok["success"], true);
    assert_eq!(ok["business_days"], -3);
    assert_eq!(ok["regime"], "semestral");

    let err = serde_json::to_value(BusinessDaysResponse::error("bad")).unwrap();
    assert_eq!(err["success"], false);
    assert_eq!(err["error"], "bad");
    assert!(err["business_days"].is_null());
}

// =============================================================================
// EVALUATE REQUEST TESTS
// =============================================================================

#[test]
fn test_evaluate_request_full_snapshot() {
    let json = r#"{
        "case": {
            "case_id": "C-9",
            "start_date": "2026-10-01",
            "actions": [
                {"case_id": "C-9", "stage_key": "initiation_notice",
                 "action_date": "2026-10-02", "status": "completed"},
                {"case_id": "C-9", "action_type": "Witness interview",
                 "action_date": "2026-10-05", "status": "in_progress",
                 "responsible": "counsellor"}
            ],
            "overrides": [
                {"stage": 2, "days": 7},
                {"stage": 3, "due_date": "2026-11-02"}
            ]
        },
        "regime": "semestral"
    }"#;

    let request: EvaluateRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.case.case_id, CaseId::new("C-9"));
    assert_eq!(request.case.actions.len(), 2);
    assert_eq!(request.case.actions[1].status, CompletionStatus::InProgress);
    assert_eq!(request.case.overrides[0].stage, StageNumber(2));
    assert_eq!(request.case.overrides[0].sla, SlaSpec::Days(7));
    assert!(matches!(request.case.overrides[1].sla, SlaSpec::DueDate(_)));
    assert_eq!(request.context.regime.as_deref(), Some("semestral"));
    assert!(request.context.today.is_none());
}

#[test]
fn test_evaluate_request_minimal_case() {
    let request: EvaluateRequest = serde_json::from_str(r#"{"case":{"case_id":"X"}}"#).unwrap();
    assert!(request.case.actions.is_empty());
    assert!(request.case.overrides.is_empty());
    assert!(request.case.start_date.is_none());
}

// =============================================================================
// TRIAGE TESTS
// =============================================================================

#[test]
fn test_triage_request_without_cases() {
    let request: TriageRequest = serde_json::from_str(r#"{"today":"2026-10-19"}"#).unwrap();
    assert!(request.cases.is_none());
    assert_eq!(request.context.today.as_deref(), Some("2026-10-19"));
}

fn alert(severity: AlertSeverity) -> CaseAlert {
    CaseAlert {
        case_id: CaseId::new("T-1"),
        current_stage: StageNumber(3),
        severity,
        sort_key: severity.sort_key(),
    }
}

#[test]
fn test_triage_entry_overdue_is_negative() {
    let entry = TriageEntry::from(&alert(AlertSeverity::Overdue { days_overdue: 4 }));
    assert_eq!(entry.bucket, AlertBucket::Overdue);
    assert_eq!(entry.days_remaining, Some(-4));
    assert_eq!(entry.current_stage, 3);
    assert_eq!(entry.label, "🔴 4 business days overdue");
}

#[test]
fn test_triage_entry_no_deadline() {
    let entry = TriageEntry::from(&alert(AlertSeverity::NoDeadline));
    assert_eq!(entry.days_remaining, None);
    assert_eq!(entry.label, "⚪ No deadline");

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["bucket"], "no_deadline");
    assert!(json["days_remaining"].is_null());
}

#[test]
fn test_triage_response_error_shape() {
    let json = serde_json::to_value(TriageResponse::error("calendar gap")).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["entries"], serde_json::json!([]));
    assert_eq!(json["error"], "calendar gap");
}
