//! # Deadline Engine
//!
//! Combines the calendar, the stage resolver and the SLA resolver into the
//! per-stage and per-case deadline view of a single case.
//!
//! For every stage:
//!
//! ```text
//! elapsed   = business_days_between(base_date, today)
//! remaining = effective_sla - elapsed
//! overdue   = remaining < 0
//! ```
//!
//! `elapsed` and `remaining` exist only when both the base date and the
//! effective SLA are known. A missing value means "no deadline", never zero.
//!
//! Completed stages are still computed so they can be shown for audit, but
//! only the current stage's result is exposed as [`CaseDeadlines::active`]
//! and feeds triage. A terminal case (all stages completed) has no active
//! result. A stage other than the current one whose dates fall outside the
//! configured calendar reports unknown values; only the current stage turns
//! a calendar gap into an error.
//!
//! The engine holds no mutable state. "today" comes in with every call.

use crate::calendar::CalendarProvider;
use crate::catalog::StageCatalog;
use crate::resolver::{StageResolution, StageResolver};
use crate::sla::{SlaContext, SlaResolver, SlaSource};
use crate::{ActionRecord, CaseId, CaseSnapshot, DueProcessError, Regime, StageNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// RESULTS
// =============================================================================

/// SLA outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineResult {
    pub stage: StageNumber,
    pub completed: bool,
    pub base_date: Option<NaiveDate>,
    pub effective_sla: Option<i64>,
    pub sla_source: Option<SlaSource>,
    pub business_days_elapsed: Option<i64>,
    /// Signed; negative once the stage is overdue.
    pub days_remaining: Option<i64>,
    pub is_overdue: bool,
}

impl DeadlineResult {
    /// A result for a stage with nothing to measure.
    #[must_use]
    pub fn no_deadline(stage: StageNumber) -> Self {
        Self {
            stage,
            completed: false,
            base_date: None,
            effective_sla: None,
            sla_source: None,
            business_days_elapsed: None,
            days_remaining: None,
            is_overdue: false,
        }
    }

    /// True when elapsed and remaining could both be computed.
    #[must_use]
    pub fn has_deadline(&self) -> bool {
        self.days_remaining.is_some()
    }
}

/// Deadline view of a whole case at one "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDeadlines {
    pub case_id: CaseId,
    pub today: NaiveDate,
    pub regime: Regime,
    /// One result per catalog stage, ascending.
    pub stages: Vec<DeadlineResult>,
    pub current_stage: Option<StageNumber>,
    /// Records no stage could be determined for.
    pub unmapped: Vec<ActionRecord>,
}

impl CaseDeadlines {
    /// Result of the current stage. `None` for terminal cases.
    #[must_use]
    pub fn active(&self) -> Option<&DeadlineResult> {
        let current = self.current_stage?;
        self.stages.iter().find(|r| r.stage == current)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_stage.is_none()
    }
}

/// The two external inputs every evaluation needs besides the case rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub today: NaiveDate,
    pub regime: Regime,
}

impl EvaluationContext {
    #[must_use]
    pub const fn new(today: NaiveDate, regime: Regime) -> Self {
        Self { today, regime }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Deadline engine over a fixed calendar and catalog.
///
/// Immutable; share it by reference or behind an `Arc` and evaluate cases
/// from as many threads as needed.
#[derive(Debug, Clone)]
pub struct DeadlineEngine {
    calendar: CalendarProvider,
    catalog: StageCatalog,
}

impl DeadlineEngine {
    #[must_use]
    pub fn new(calendar: CalendarProvider, catalog: StageCatalog) -> Self {
        Self { calendar, catalog }
    }

    /// Engine over the builtin calendar and the standard catalog.
    pub fn standard() -> Result<Self, DueProcessError> {
        Ok(Self::new(
            CalendarProvider::builtin()?,
            StageCatalog::standard()?,
        ))
    }

    #[must_use]
    pub fn calendar(&self) -> &CalendarProvider {
        &self.calendar
    }

    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Resolve stage states of `case` without computing deadlines.
    #[must_use]
    pub fn resolve(&self, case: &CaseSnapshot) -> StageResolution {
        StageResolver::new(&self.catalog).resolve(case)
    }

    /// Compute the deadline view of `case`.
    pub fn evaluate(
        &self,
        case: &CaseSnapshot,
        ctx: EvaluationContext,
    ) -> Result<CaseDeadlines, DueProcessError> {
        let resolution = self.resolve(case);
        self.evaluate_resolution(resolution, &case.overrides, ctx)
    }

    /// Compute deadlines from an already resolved case.
    pub fn evaluate_resolution(
        &self,
        resolution: StageResolution,
        overrides: &[crate::SlaOverride],
        ctx: EvaluationContext,
    ) -> Result<CaseDeadlines, DueProcessError> {
        let sla_resolver = SlaResolver::new(&self.catalog, &self.calendar);
        let current = resolution.current_stage;

        let stages = resolution
            .stages
            .iter()
            .map(|state| {
                let audit_only = Some(state.stage) != current;
                let sla = sla_resolver.effective_sla(
                    state.stage,
                    &SlaContext {
                        overrides,
                        base_date: state.base_date,
                        regime: ctx.regime,
                    },
                );
                let sla = audit_value(audit_only, state.stage, sla)?.flatten();

                let elapsed = match (state.base_date, sla) {
                    (Some(base), Some(_)) => audit_value(
                        audit_only,
                        state.stage,
                        self.calendar
                            .business_days_between(base, ctx.today, ctx.regime),
                    )?,
                    _ => None,
                };
                let remaining = sla
                    .zip(elapsed)
                    .map(|(sla, elapsed)| sla.days.saturating_sub(elapsed));

                Ok(DeadlineResult {
                    stage: state.stage,
                    completed: state.completed,
                    base_date: state.base_date,
                    effective_sla: sla.map(|s| s.days),
                    sla_source: sla.map(|s| s.source),
                    business_days_elapsed: elapsed,
                    days_remaining: remaining,
                    is_overdue: remaining.is_some_and(|r| r < 0),
                })
            })
            .collect::<Result<Vec<_>, DueProcessError>>()?;

        Ok(CaseDeadlines {
            case_id: resolution.case_id,
            today: ctx.today,
            regime: ctx.regime,
            stages,
            current_stage: resolution.current_stage,
            unmapped: resolution.unmapped,
        })
    }
}

/// Calendar gaps only fail the current stage. Any other stage is audit data
/// and reports an unknown value instead.
fn audit_value<T>(
    audit_only: bool,
    stage: StageNumber,
    value: Result<T, DueProcessError>,
) -> Result<Option<T>, DueProcessError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(DueProcessError::CalendarNotConfigured { year, regime }) if audit_only => {
            tracing::debug!(%stage, year, %regime, "audit stage outside calendar");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
