//! # dueproc-core
//!
//! The deterministic deadline engine for disciplinary due process - THE LOGIC.
//!
//! A case moves through a fixed, ordered catalog of stages. Each stage may
//! carry a deadline in business days. This crate answers, for a snapshot of
//! a case's action records and an injected "today":
//! - which stage the case is in,
//! - how many business days each stage has used and has left,
//! - how urgent the case is compared to the others.
//!
//! ## Pipeline
//!
//! ```text
//! CaseSnapshot ──► StageResolver ──► SlaResolver ──► DeadlineEngine ──► AlertClassifier
//!                        │                 │                │
//!                  StageCatalog      CalendarProvider ◄─────┘
//! ```
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network, NO clock reads: "today" is always a parameter
//! - Deterministic: BTreeMap only, integer arithmetic only
//! - Immutable configuration: calendar and catalog are built once
//! - Missing calendar data is an error, never a silent fallback

// =============================================================================
// MODULES
// =============================================================================

pub mod alert;
pub mod calendar;
pub mod catalog;
pub mod deadline;
pub mod display;
pub mod primitives;
pub mod resolver;
pub mod sla;
pub mod source;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ActionRecord, CaseId, CaseSnapshot, CompletionStatus, DueProcessError, Regime, SlaOverride,
    SlaSpec, StageNumber, parse_date,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use alert::{
    AlertBucket, AlertClassifier, AlertSeverity, CaseAlert, SortKey, TriageReport, build_triage,
    sort_alerts,
};
pub use calendar::{CalendarDataset, CalendarProvider, ExclusionReason, NonBusinessDay};
pub use catalog::{KeywordRule, StageCatalog, StageDefinition};
pub use deadline::{CaseDeadlines, DeadlineEngine, DeadlineResult, EvaluationContext};
pub use display::severity_label;
pub use resolver::{Placement, StageResolution, StageResolver, StageState};
pub use sla::{EffectiveSla, SlaContext, SlaResolver, SlaSource};
pub use source::{CaseSource, InMemoryCaseSource};
