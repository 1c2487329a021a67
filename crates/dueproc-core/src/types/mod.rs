//! # Core Type Definitions
//!
//! This module contains the input rows and shared identifiers of the
//! deadline engine:
//! - Case and stage identifiers (`CaseId`, `StageNumber`)
//! - Calendar regime selection (`Regime`)
//! - Raw action rows as produced by the record store (`ActionRecord`)
//! - Externally supplied SLA data (`SlaOverride`, `SlaSpec`)
//! - A single case's input snapshot (`CaseSnapshot`)
//! - Error types (`DueProcessError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they are used as `BTreeMap`/`BTreeSet` keys
//! - Are plain snapshots; the engine never mutates them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a disciplinary case in the external record store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl CaseId {
    /// Create a case id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a stage in the catalog, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct StageNumber(pub u8);

impl StageNumber {
    /// The first stage of every catalog.
    pub const FIRST: StageNumber = StageNumber(1);

    /// Get the raw stage number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for StageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// REGIME
// =============================================================================

/// Institutional calendar variant. Selects which recess windows apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Two academic terms with a single winter recess.
    Semestral,
    /// Three academic terms with winter and spring recesses.
    Trimestral,
}

impl Regime {
    /// All regimes, in declaration order.
    pub const ALL: [Regime; 2] = [Regime::Semestral, Regime::Trimestral];

    /// Stable lowercase identifier, as used in calendar datasets.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Semestral => "semestral",
            Regime::Trimestral => "trimestral",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Regime {
    type Err = DueProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semestral" => Ok(Regime::Semestral),
            "trimestral" => Ok(Regime::Trimestral),
            other => Err(DueProcessError::CalendarConfig(format!(
                "unknown regime '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// ACTION RECORDS
// =============================================================================

/// Completion status of a logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Pending,
    InProgress,
    Completed,
}

impl CompletionStatus {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionStatus::Completed)
    }
}

/// One logged action against a case.
///
/// Upstream producers are inconsistent: some write a catalog `stage_key`,
/// others only a free-text `action_type`. Either may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub case_id: CaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    pub action_date: NaiveDate,
    pub status: CompletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionRecord {
    /// Create a record carrying an explicit stage key.
    #[must_use]
    pub fn keyed(
        case_id: CaseId,
        stage_key: impl Into<String>,
        action_date: NaiveDate,
        status: CompletionStatus,
    ) -> Self {
        Self {
            case_id,
            stage_key: Some(stage_key.into()),
            action_type: None,
            action_date,
            status,
            responsible: None,
            detail: None,
        }
    }

    /// Create a record carrying only free-text action type.
    #[must_use]
    pub fn typed(
        case_id: CaseId,
        action_type: impl Into<String>,
        action_date: NaiveDate,
        status: CompletionStatus,
    ) -> Self {
        Self {
            case_id,
            stage_key: None,
            action_type: Some(action_type.into()),
            action_date,
            status,
            responsible: None,
            detail: None,
        }
    }

    /// Attach the person responsible for the action.
    #[must_use]
    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }

    /// Attach free-text detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Total ordering used wherever records must be ranked without
    /// depending on input order: date first, then the remaining fields.
    pub(crate) fn rank_key(
        &self,
    ) -> (
        NaiveDate,
        CompletionStatus,
        Option<&str>,
        Option<&str>,
        Option<&str>,
        Option<&str>,
    ) {
        (
            self.action_date,
            self.status,
            self.stage_key.as_deref(),
            self.action_type.as_deref(),
            self.responsible.as_deref(),
            self.detail.as_deref(),
        )
    }
}

// =============================================================================
// SLA OVERRIDES
// =============================================================================

/// How an override expresses its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaSpec {
    /// An explicit number of business days.
    Days(i64),
    /// A target date; the day count is derived from the stage's base date.
    DueDate(NaiveDate),
}

/// An externally supplied SLA for one stage of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaOverride {
    pub stage: StageNumber,
    #[serde(flatten)]
    pub sla: SlaSpec,
}

impl SlaOverride {
    #[must_use]
    pub const fn days(stage: StageNumber, days: i64) -> Self {
        Self {
            stage,
            sla: SlaSpec::Days(days),
        }
    }

    #[must_use]
    pub const fn due_date(stage: StageNumber, date: NaiveDate) -> Self {
        Self {
            stage,
            sla: SlaSpec::DueDate(date),
        }
    }
}

// =============================================================================
// CASE SNAPSHOT
// =============================================================================

/// Everything the engine needs to know about one case, as read from the
/// record store at a single point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub case_id: CaseId,
    /// Date the case was opened. Starts the stage-1 clock when no action
    /// has been logged yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    #[serde(default)]
    pub overrides: Vec<SlaOverride>,
}

impl CaseSnapshot {
    #[must_use]
    pub fn new(case_id: CaseId) -> Self {
        Self {
            case_id,
            start_date: None,
            actions: Vec::new(),
            overrides: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionRecord) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_override(mut self, sla_override: SlaOverride) -> Self {
        self.overrides.push(sla_override);
        self
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the deadline engine.
///
/// - No silent failures
/// - Missing calendar data is never papered over with calendar-day math
/// - The engine never panics; all errors are returned
#[derive(Debug, Error)]
pub enum DueProcessError {
    /// No calendar data is configured for the requested year/regime pair.
    #[error("Calendar not configured for year {year}, regime {regime}")]
    CalendarNotConfigured { year: i32, regime: Regime },

    /// The calendar dataset could not be parsed or failed validation.
    #[error("Calendar configuration error: {0}")]
    CalendarConfig(String),

    /// The stage catalog violates its construction invariants.
    #[error("Invalid stage catalog: {0}")]
    InvalidCatalog(String),

    /// A date could not be parsed or is out of range.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred while reading from a case source.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl DueProcessError {
    /// True for the errors that indicate missing or unusable calendar
    /// configuration.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DueProcessError::CalendarNotConfigured { .. } | DueProcessError::CalendarConfig(_)
        )
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DueProcessError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| DueProcessError::InvalidDate(format!("'{}': {}", s, e)))
}

// =============================================================================
// TESTS
// =============================================================================
