//! # Validation Tier Tests (T0-T4)
//!
//! If ANY tier fails, deadlines reported by the engine cannot be trusted.
//!
//! ## Tiers
//! - T0: Calendar Integrity
//! - T1: Stage Resolution
//! - T2: Deadline Boundaries
//! - T3: Triage
//! - T4: Configuration Errors
//!
//! Dates are in October 2026 under the builtin calendar. Monday 2026-10-12
//! is a holiday; the weeks around it carry no recess for either regime.

use chrono::NaiveDate;
use dueproc_core::{
    ActionRecord, AlertBucket, AlertClassifier, AlertSeverity, CaseId, CaseSnapshot,
    CompletionStatus, DeadlineEngine, DueProcessError, EvaluationContext, Regime, StageNumber,
    build_triage,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn today() -> NaiveDate {
    date(2026, 10, 19)
}

fn engine() -> DeadlineEngine {
    DeadlineEngine::standard().expect("standard engine")
}

fn ctx() -> EvaluationContext {
    EvaluationContext::new(today(), Regime::Semestral)
}

fn keyed(case: &str, key: &str, d: NaiveDate, status: CompletionStatus) -> ActionRecord {
    ActionRecord::keyed(CaseId::new(case), key, d, status)
}

/// Case with stages `1..=through` completed early in October.
fn completed_through(case: &str, through: u8) -> CaseSnapshot {
    completed_on(case, through, date(2026, 10, 1))
}

/// Case with stages `1..=through` completed on `day`.
fn completed_on(case: &str, through: u8, day: NaiveDate) -> CaseSnapshot {
    let keys = [
        "initiation_notice",
        "statement_of_defense",
        "investigation",
        "hearing",
        "resolution",
        "resolution_notice",
        "appeal",
        "closure",
    ];
    keys.iter()
        .take(usize::from(through))
        .fold(CaseSnapshot::new(CaseId::new(case)), |snapshot, key| {
            snapshot.with_action(keyed(case, key, day, CompletionStatus::Completed))
        })
}

// =============================================================================
// TIER T0: CALENDAR INTEGRITY
// =============================================================================

mod t0_calendar_integrity {
    use super::*;

    /// T0.1: A holiday Monday does not count.
    #[test]
    fn holiday_skipped() {
        let engine = engine();
        let count = engine
            .calendar()
            .business_days_between(date(2026, 10, 9), date(2026, 10, 13), Regime::Semestral)
            .expect("count");
        assert_eq!(count, 1);
    }

    /// T0.2: Ten business days separate 2026-10-02 and 2026-10-19.
    #[test]
    fn ten_business_days_across_holiday() {
        let engine = engine();
        let count = engine
            .calendar()
            .business_days_between(date(2026, 10, 2), today(), Regime::Trimestral)
            .expect("count");
        assert_eq!(count, 10);
    }

    /// T0.3: Regimes diverge inside a recess window.
    #[test]
    fn recess_depends_on_regime() {
        let engine = engine();
        let semestral = engine
            .calendar()
            .business_days_between(date(2026, 6, 15), date(2026, 7, 3), Regime::Semestral)
            .expect("semestral");
        let trimestral = engine
            .calendar()
            .business_days_between(date(2026, 6, 15), date(2026, 7, 3), Regime::Trimestral)
            .expect("trimestral");
        assert_ne!(semestral, trimestral);
    }
}

// =============================================================================
// TIER T1: STAGE RESOLUTION
// =============================================================================

mod t1_stage_resolution {
    use super::*;

    /// T1.1: A later completed record is the evidence, over an earlier pending one.
    #[test]
    fn later_completed_record_is_evidence() {
        let case = completed_through("T1", 3)
            .with_action(keyed("T1", "hearing", date(2026, 10, 6), CompletionStatus::Pending))
            .with_action(keyed(
                "T1",
                "hearing",
                date(2026, 10, 8),
                CompletionStatus::Completed,
            ));

        let resolution = engine().resolve(&case);
        let hearing = resolution.state(StageNumber(4)).expect("stage 4");
        assert!(hearing.completed);
        assert_eq!(hearing.action_count, 2);
        let evidence = hearing.evidencing_action.as_ref().expect("evidence");
        assert_eq!(evidence.action_date, date(2026, 10, 8));
        assert_eq!(evidence.status, CompletionStatus::Completed);
        assert_eq!(hearing.base_date, Some(date(2026, 10, 8)));
        assert_eq!(resolution.current_stage, Some(StageNumber(5)));
    }

    /// T1.2: Unrecognised free text is unmapped and does not advance the case.
    #[test]
    fn free_text_is_unmapped() {
        let case = CaseSnapshot::new(CaseId::new("T1"))
            .with_start_date(date(2026, 10, 14))
            .with_action(ActionRecord::typed(
                CaseId::new("T1"),
                "coffee with the counsellor",
                date(2026, 10, 15),
                CompletionStatus::Completed,
            ));

        let resolution = engine().resolve(&case);
        assert_eq!(resolution.unmapped.len(), 1);
        assert_eq!(resolution.current_stage, Some(StageNumber(1)));
        assert_eq!(resolution.completed_count(), 0);
    }

    /// T1.3: Keyword fallback places a record without a stage key.
    #[test]
    fn keyword_fallback_places_record() {
        let case = completed_through("T1", 1).with_action(ActionRecord::typed(
            CaseId::new("T1"),
            "Written STATEMENT received",
            date(2026, 10, 5),
            CompletionStatus::Completed,
        ));

        let resolution = engine().resolve(&case);
        assert!(resolution.unmapped.is_empty());
        assert_eq!(resolution.current_stage, Some(StageNumber(3)));
    }

    /// T1.5: A stage key outside the catalog is unmapped, even when its text
    /// resembles a stage.
    #[test]
    fn unknown_stage_key_is_unmapped() {
        let case = completed_through("T1", 1).with_action(keyed(
            "T1",
            "defense_statement_v2",
            date(2026, 10, 5),
            CompletionStatus::Completed,
        ));

        let resolution = engine().resolve(&case);
        assert_eq!(resolution.unmapped.len(), 1);
        assert_eq!(
            resolution.unmapped[0].stage_key.as_deref(),
            Some("defense_statement_v2")
        );
        assert_eq!(resolution.current_stage, Some(StageNumber(2)));
        assert_eq!(resolution.completed_count(), 1);
    }

    /// T1.4: Every stage completed means no current stage.
    #[test]
    fn all_completed_is_terminal() {
        let resolution = engine().resolve(&completed_through("T1", 8));
        assert!(resolution.is_terminal());
        assert_eq!(resolution.current_stage, None);
        assert_eq!(resolution.completed_count(), 8);
    }
}

// =============================================================================
// TIER T2: DEADLINE BOUNDARIES
// =============================================================================

mod t2_deadline_boundaries {
    use super::*;

    /// T2.1: Base ten business days back with a ten-day SLA is due today.
    #[test]
    fn ten_of_ten_is_due_today() {
        let case = completed_through("T2", 2).with_action(keyed(
            "T2",
            "investigation",
            date(2026, 10, 2),
            CompletionStatus::InProgress,
        ));

        let deadlines = engine().evaluate(&case, ctx()).expect("evaluate");
        let active = deadlines.active().expect("active");
        assert_eq!(active.stage, StageNumber(3));
        assert_eq!(active.effective_sla, Some(10));
        assert_eq!(active.business_days_elapsed, Some(10));
        assert_eq!(active.days_remaining, Some(0));
        assert!(!active.is_overdue);
        assert_eq!(AlertClassifier::new().classify(active), AlertSeverity::DueToday);
    }

    /// T2.2: Three remaining is due soon.
    #[test]
    fn three_remaining_is_due_soon() {
        let case = completed_through("T2", 3).with_action(keyed(
            "T2",
            "hearing",
            date(2026, 10, 15),
            CompletionStatus::Pending,
        ));

        let deadlines = engine().evaluate(&case, ctx()).expect("evaluate");
        let active = deadlines.active().expect("active");
        assert_eq!(active.days_remaining, Some(3));
        assert_eq!(
            AlertClassifier::new().classify(active),
            AlertSeverity::DueSoon { days_remaining: 3 }
        );
    }

    /// T2.3: Four remaining is on track.
    #[test]
    fn four_remaining_is_on_track() {
        let case = completed_through("T2", 3).with_action(keyed(
            "T2",
            "hearing",
            date(2026, 10, 16),
            CompletionStatus::Pending,
        ));

        let deadlines = engine().evaluate(&case, ctx()).expect("evaluate");
        let active = deadlines.active().expect("active");
        assert_eq!(active.days_remaining, Some(4));
        assert_eq!(
            AlertClassifier::new().classify(active),
            AlertSeverity::OnTrack { days_remaining: 4 }
        );
    }

    /// T2.4: One business day past the SLA is overdue by one.
    #[test]
    fn eleven_of_ten_is_overdue() {
        let case = completed_through("T2", 2).with_action(keyed(
            "T2",
            "investigation",
            date(2026, 10, 1),
            CompletionStatus::Pending,
        ));

        let deadlines = engine().evaluate(&case, ctx()).expect("evaluate");
        let active = deadlines.active().expect("active");
        assert_eq!(active.days_remaining, Some(-1));
        assert!(active.is_overdue);
    }
}

// =============================================================================
// TIER T3: TRIAGE
// =============================================================================

mod t3_triage {
    use super::*;

    /// T3.1: Terminal cases never reach a bucket; the rest are ordered.
    #[test]
    fn terminal_cases_excluded_and_order_is_urgency() {
        let cases = vec![
            completed_through("done", 8),
            completed_through("soon", 3).with_action(keyed(
                "soon",
                "hearing",
                date(2026, 10, 15),
                CompletionStatus::Pending,
            )),
            completed_through("today", 2).with_action(keyed(
                "today",
                "investigation",
                date(2026, 10, 2),
                CompletionStatus::Pending,
            )),
            CaseSnapshot::new(CaseId::new("blank")),
            completed_through("late", 2).with_action(keyed(
                "late",
                "investigation",
                date(2026, 9, 21),
                CompletionStatus::Pending,
            )),
        ];

        let report =
            build_triage(&engine(), &AlertClassifier::new(), &cases, ctx()).expect("triage");

        assert_eq!(report.terminal, vec![CaseId::new("done")]);
        let order: Vec<&str> = report.entries.iter().map(|e| e.case_id.as_str()).collect();
        assert_eq!(order, vec!["late", "today", "soon", "blank"]);
        assert!(
            AlertBucket::ALL
                .iter()
                .all(|b| report.bucket(*b).all(|e| e.case_id.as_str() != "done"))
        );
        assert_eq!(report.bucket(AlertBucket::NoDeadline).count(), 1);
    }

    /// T3.2: A closed case dated outside the calendar stays out of triage
    /// and does not block live cases.
    #[test]
    fn old_terminal_case_does_not_block_batch() {
        let cases = vec![
            completed_on("archived", 8, date(2023, 11, 6)),
            CaseSnapshot::new(CaseId::new("live")).with_start_date(date(2026, 10, 14)),
        ];

        let report =
            build_triage(&engine(), &AlertClassifier::new(), &cases, ctx()).expect("triage");

        assert_eq!(report.terminal, vec![CaseId::new("archived")]);
        assert_eq!(report.entries.len(), 1);
        let live = &report.entries[0];
        assert_eq!(live.case_id, CaseId::new("live"));
        assert_eq!(live.current_stage, StageNumber(1));
        // Wed 2026-10-14 -> Mon 2026-10-19 is 3 business days against an SLA of 2.
        assert_eq!(live.severity, AlertSeverity::Overdue { days_overdue: 1 });
    }
}

// =============================================================================
// TIER T4: CONFIGURATION ERRORS
// =============================================================================

mod t4_configuration_errors {
    use super::*;
    use dueproc_core::{CalendarProvider, StageCatalog, StageDefinition};

    /// T4.1: An unconfigured year is an explicit error, not a guess.
    #[test]
    fn unconfigured_year_is_error() {
        let engine = engine();
        let err = engine
            .calendar()
            .business_days_between(date(2026, 12, 28), date(2027, 1, 8), Regime::Semestral)
            .expect_err("2027 missing");
        assert!(matches!(
            err,
            DueProcessError::CalendarNotConfigured { year: 2027, .. }
        ));
    }

    /// T4.2: One bad case aborts the whole triage batch.
    #[test]
    fn triage_aborts_on_calendar_gap() {
        let cases = vec![CaseSnapshot::new(CaseId::new("old")).with_start_date(date(2019, 3, 1))];
        let result = build_triage(&engine(), &AlertClassifier::new(), &cases, ctx());
        assert!(matches!(
            result,
            Err(DueProcessError::CalendarNotConfigured { year: 2019, .. })
        ));
    }

    /// T4.3: A catalog with a gap in stage numbers is rejected.
    #[test]
    fn non_contiguous_catalog_rejected() {
        let result = StageCatalog::new(vec![
            StageDefinition::new(1, "first", "First", Some(2)),
            StageDefinition::new(3, "third", "Third", Some(2)),
        ]);
        assert!(matches!(result, Err(DueProcessError::InvalidCatalog(_))));
    }

    /// T4.4: A malformed calendar dataset is rejected at load.
    #[test]
    fn malformed_calendar_rejected() {
        let result = CalendarProvider::from_toml_str("format_version = 1\njurisdiction = 3\n");
        assert!(result.is_err());
    }
}
