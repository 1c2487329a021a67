//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every response that can fail carries `success` and `error` so clients can
//! branch on the body alone.

use dueproc_core::{
    AlertBucket, AlertSeverity, CaseAlert, CaseDeadlines, CaseId, CaseSnapshot, DueProcessError,
    NonBusinessDay, Regime, StageDefinition, severity_label,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STAGES RESPONSE
// =============================================================================

/// The stage catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesResponse {
    pub count: usize,
    pub stages: Vec<StageDefinition>,
}

// =============================================================================
// EVALUATION CONTEXT
// =============================================================================

/// Optional `today`/`regime` carried by request bodies and query strings.
///
/// Missing values fall back to the server defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regime: Option<String>,
}

impl ContextParams {
    /// Parse the regime, if one was given.
    pub fn parse_regime(&self) -> Result<Option<Regime>, DueProcessError> {
        self.regime.as_deref().map(str::parse).transpose()
    }

    /// Parse today, if one was given.
    pub fn parse_today(&self) -> Result<Option<NaiveDate>, DueProcessError> {
        self.today
            .as_deref()
            .map(dueproc_core::parse_date)
            .transpose()
    }
}

// =============================================================================
// CALENDAR RESPONSE
// =============================================================================

/// Non-business days of one configured year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub success: bool,
    pub year: i32,
    pub regime: Option<Regime>,
    pub jurisdiction: Option<String>,
    pub business_day_count: Option<usize>,
    pub non_business_days: Vec<NonBusinessDay>,
    pub error: Option<String>,
}

impl CalendarResponse {
    pub fn error(year: i32, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            year,
            regime: None,
            jurisdiction: None,
            business_day_count: None,
            non_business_days: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// BUSINESS DAYS REQUEST/RESPONSE
// =============================================================================

/// Signed business-day count request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDaysRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regime: Option<String>,
}

/// Signed business-day count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDaysResponse {
    pub success: bool,
    pub business_days: Option<i64>,
    pub regime: Option<Regime>,
    pub error: Option<String>,
}

impl BusinessDaysResponse {
    pub fn success(business_days: i64, regime: Regime) -> Self {
        Self {
            success: true,
            business_days: Some(business_days),
            regime: Some(regime),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            business_days: None,
            regime: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EVALUATE REQUEST/RESPONSE
// =============================================================================

/// Evaluate one case snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub case: CaseSnapshot,
    #[serde(flatten)]
    pub context: ContextParams,
}

/// Per-stage deadlines of one case plus its alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub deadlines: Option<CaseDeadlines>,
    /// `None` for terminal cases.
    pub alert: Option<TriageEntry>,
    pub error: Option<String>,
}

impl EvaluateResponse {
    pub fn success(deadlines: CaseDeadlines, alert: Option<&CaseAlert>) -> Self {
        Self {
            success: true,
            deadlines: Some(deadlines),
            alert: alert.map(TriageEntry::from),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            deadlines: None,
            alert: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// TRIAGE REQUEST/RESPONSE
// =============================================================================

/// Triage a batch of snapshots. Without `cases` the server's own source is
/// used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cases: Option<Vec<CaseSnapshot>>,
    #[serde(flatten)]
    pub context: ContextParams,
}

/// One line of a triage list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageEntry {
    pub case_id: CaseId,
    pub current_stage: u8,
    pub bucket: AlertBucket,
    /// Signed remaining business days; negative when overdue, absent when
    /// the stage has no deadline.
    pub days_remaining: Option<i64>,
    pub label: String,
}

impl From<&CaseAlert> for TriageEntry {
    fn from(alert: &CaseAlert) -> Self {
        let days_remaining = match alert.severity {
            AlertSeverity::Overdue { days_overdue } => Some(days_overdue.saturating_neg()),
            AlertSeverity::DueToday => Some(0),
            AlertSeverity::DueSoon { days_remaining }
            | AlertSeverity::OnTrack { days_remaining } => Some(days_remaining),
            AlertSeverity::NoDeadline => None,
        };
        Self {
            case_id: alert.case_id.clone(),
            current_stage: alert.current_stage.value(),
            bucket: alert.severity.bucket(),
            days_remaining,
            label: severity_label(&alert.severity),
        }
    }
}

/// Sorted triage list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResponse {
    pub success: bool,
    pub today: Option<NaiveDate>,
    pub regime: Option<Regime>,
    pub entries: Vec<TriageEntry>,
    /// Cases with every stage completed; not part of any bucket.
    pub terminal: Vec<CaseId>,
    pub error: Option<String>,
}

impl TriageResponse {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            today: None,
            regime: None,
            entries: Vec::new(),
            terminal: Vec::new(),
            error: Some(msg.into()),
        }
    }
}
