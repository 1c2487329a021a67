//! # Alert Classification
//!
//! Buckets a case's active deadline into a five-level severity taxonomy and
//! orders cases for triage lists.
//!
//! | Remaining business days | Severity |
//! |-------------------------|----------|
//! | `< 0` | `Overdue` (by `-remaining`) |
//! | `0` | `DueToday` |
//! | `1..=3` | `DueSoon` |
//! | `> 3` | `OnTrack` |
//! | unknown | `NoDeadline` |
//!
//! ## Ordering
//!
//! `Overdue < DueToday < DueSoon < OnTrack < NoDeadline`. Inside `Overdue`
//! the most late case comes first; inside `DueSoon` and `OnTrack` the
//! fewest remaining days come first. Ties, and the whole `NoDeadline`
//! bucket, fall back to case id so the order is total and repeatable.
//!
//! Display strings live in [`crate::display`]; nothing here formats text.

use crate::deadline::{CaseDeadlines, DeadlineEngine, DeadlineResult, EvaluationContext};
use crate::primitives::DUE_SOON_THRESHOLD;
use crate::{CaseId, CaseSnapshot, DueProcessError, Regime, StageNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity bucket without its magnitude, in triage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertBucket {
    Overdue,
    DueToday,
    DueSoon,
    OnTrack,
    NoDeadline,
}

impl AlertBucket {
    /// Every bucket, in triage order.
    pub const ALL: [AlertBucket; 5] = [
        AlertBucket::Overdue,
        AlertBucket::DueToday,
        AlertBucket::DueSoon,
        AlertBucket::OnTrack,
        AlertBucket::NoDeadline,
    ];

    /// Position in triage order, starting at 0.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            AlertBucket::Overdue => 0,
            AlertBucket::DueToday => 1,
            AlertBucket::DueSoon => 2,
            AlertBucket::OnTrack => 3,
            AlertBucket::NoDeadline => 4,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertBucket::Overdue => "overdue",
            AlertBucket::DueToday => "due_today",
            AlertBucket::DueSoon => "due_soon",
            AlertBucket::OnTrack => "on_track",
            AlertBucket::NoDeadline => "no_deadline",
        }
    }
}

/// Triage severity of a case, with the magnitude that orders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "snake_case")]
pub enum AlertSeverity {
    Overdue { days_overdue: i64 },
    DueToday,
    DueSoon { days_remaining: i64 },
    OnTrack { days_remaining: i64 },
    NoDeadline,
}

impl AlertSeverity {
    #[must_use]
    pub fn bucket(&self) -> AlertBucket {
        match self {
            AlertSeverity::Overdue { .. } => AlertBucket::Overdue,
            AlertSeverity::DueToday => AlertBucket::DueToday,
            AlertSeverity::DueSoon { .. } => AlertBucket::DueSoon,
            AlertSeverity::OnTrack { .. } => AlertBucket::OnTrack,
            AlertSeverity::NoDeadline => AlertBucket::NoDeadline,
        }
    }

    /// Numeric key for triage ordering (ascending = most urgent first).
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        let within = match self {
            AlertSeverity::Overdue { days_overdue } => days_overdue.saturating_neg(),
            AlertSeverity::DueSoon { days_remaining }
            | AlertSeverity::OnTrack { days_remaining } => *days_remaining,
            AlertSeverity::DueToday | AlertSeverity::NoDeadline => 0,
        };
        SortKey {
            bucket: self.bucket().rank(),
            within,
        }
    }
}

/// Two-level numeric ordering key: bucket rank, then position inside the
/// bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SortKey {
    pub bucket: u8,
    pub within: i64,
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Case-level alert: the classification of the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAlert {
    pub case_id: CaseId,
    pub current_stage: StageNumber,
    #[serde(flatten)]
    pub severity: AlertSeverity,
    pub sort_key: SortKey,
}

/// Maps deadline results to severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertClassifier {
    due_soon_threshold: i64,
}

impl Default for AlertClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertClassifier {
    /// Classifier with the standard three-day "due soon" window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            due_soon_threshold: DUE_SOON_THRESHOLD,
        }
    }

    /// Classifier with a custom "due soon" window (clamped to >= 1).
    #[must_use]
    pub fn with_due_soon_threshold(days: i64) -> Self {
        Self {
            due_soon_threshold: days.max(1),
        }
    }

    #[must_use]
    pub fn due_soon_threshold(&self) -> i64 {
        self.due_soon_threshold
    }

    /// Classify one deadline result.
    #[must_use]
    pub fn classify(&self, result: &DeadlineResult) -> AlertSeverity {
        match result.days_remaining {
            None => AlertSeverity::NoDeadline,
            Some(r) if r < 0 => AlertSeverity::Overdue {
                days_overdue: r.saturating_neg(),
            },
            Some(0) => AlertSeverity::DueToday,
            Some(r) if r <= self.due_soon_threshold => AlertSeverity::DueSoon { days_remaining: r },
            Some(r) => AlertSeverity::OnTrack { days_remaining: r },
        }
    }

    /// Case-level alert from the current stage only. `None` for terminal
    /// cases, which never appear in triage.
    #[must_use]
    pub fn assess(&self, deadlines: &CaseDeadlines) -> Option<CaseAlert> {
        let active = deadlines.active()?;
        let severity = self.classify(active);
        Some(CaseAlert {
            case_id: deadlines.case_id.clone(),
            current_stage: active.stage,
            severity,
            sort_key: severity.sort_key(),
        })
    }
}

// =============================================================================
// TRIAGE
// =============================================================================

/// Sorted triage list of a batch of cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageReport {
    pub today: NaiveDate,
    pub regime: Regime,
    /// Non-terminal cases, most urgent first.
    pub entries: Vec<CaseAlert>,
    /// Cases with every stage completed, by case id.
    pub terminal: Vec<CaseId>,
}

impl TriageReport {
    /// Entries of one bucket, in triage order.
    pub fn bucket(&self, bucket: AlertBucket) -> impl Iterator<Item = &CaseAlert> {
        self.entries
            .iter()
            .filter(move |e| e.severity.bucket() == bucket)
    }
}

/// Sort alerts into triage order.
pub fn sort_alerts(alerts: &mut [CaseAlert]) {
    alerts.sort_by(|a, b| (a.sort_key, &a.case_id).cmp(&(b.sort_key, &b.case_id)));
}

/// Run the full pipeline over a batch of case snapshots.
///
/// Terminal cases are set aside before any deadline is computed. A calendar
/// configuration error on a live case's current stage aborts the whole
/// batch.
pub fn build_triage(
    engine: &DeadlineEngine,
    classifier: &AlertClassifier,
    cases: &[CaseSnapshot],
    ctx: EvaluationContext,
) -> Result<TriageReport, DueProcessError> {
    let mut entries = Vec::with_capacity(cases.len());
    let mut terminal = Vec::new();

    for case in cases {
        let resolution = engine.resolve(case);
        if resolution.is_terminal() {
            terminal.push(resolution.case_id);
            continue;
        }
        let deadlines = engine.evaluate_resolution(resolution, &case.overrides, ctx)?;
        match classifier.assess(&deadlines) {
            Some(alert) => entries.push(alert),
            None => terminal.push(deadlines.case_id),
        }
    }

    sort_alerts(&mut entries);
    terminal.sort();

    tracing::debug!(
        cases = cases.len(),
        active = entries.len(),
        terminal = terminal.len(),
        "triage built"
    );

    Ok(TriageReport {
        today: ctx.today,
        regime: ctx.regime,
        entries,
        terminal,
    })
}

// =============================================================================
// TESTS
// =============================================================================
