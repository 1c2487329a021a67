//! # Stage Resolver
//!
//! Maps a case's raw action records onto the stage catalog.
//!
//! Each record is placed by, in order:
//! 1. its `stage_key`, compared for exact equality with catalog keys;
//! 2. when the record carries no key, the catalog's keyword table applied
//!    to `action_type`.
//!
//! A key that names no catalog stage is not retried against the keyword
//! table. Such records, and records that match nothing, land in the
//! `unmapped` bucket: kept for audit, logged as a data-quality warning, and
//! ignored for completion.
//!
//! Base dates: a completed stage starts at its latest completed record, an
//! incomplete stage at its earliest record, and stage 1 without records at
//! the case start date. Any later stage without records of its own has no
//! base date. A case whose previous stage just completed therefore reports
//! `noDeadline` until the first action of its current stage is recorded.
//!
//! Resolution is a fold over the records into a per-stage accumulator. Every
//! choice made inside the fold (latest completed record, earliest record) is
//! by a total order on the record contents, so the result does not depend
//! on the order the store returned the rows in.

use crate::catalog::StageCatalog;
use crate::{ActionRecord, CaseId, CaseSnapshot, StageNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// RESOLUTION OF ONE RECORD
// =============================================================================

/// How a record was placed on a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Placement {
    /// Exact catalog key on the record.
    StageKey,
    /// Keyword fallback. `candidates` counts every rule that matched; more
    /// than one means first-match ambiguity decided the stage.
    Keyword { phrase: String, candidates: usize },
}

impl Placement {
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Placement::Keyword { candidates, .. } if *candidates > 1)
    }
}

// =============================================================================
// STAGE STATE
// =============================================================================

/// Resolved status of one stage for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageState {
    pub stage: StageNumber,
    pub completed: bool,
    /// Most recent completed record for this stage.
    pub evidencing_action: Option<ActionRecord>,
    /// Date the SLA clock starts.
    pub base_date: Option<NaiveDate>,
    /// Number of records placed on this stage, any status.
    pub action_count: usize,
}

/// Resolved stage states of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResolution {
    pub case_id: CaseId,
    /// One entry per catalog stage, ascending.
    pub stages: Vec<StageState>,
    /// Lowest incomplete stage; `None` once every stage is completed.
    pub current_stage: Option<StageNumber>,
    /// Records no stage could be determined for, in date order.
    pub unmapped: Vec<ActionRecord>,
}

impl StageResolution {
    /// A case is terminal when every stage is completed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_stage.is_none()
    }

    #[must_use]
    pub fn state(&self, stage: StageNumber) -> Option<&StageState> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&StageState> {
        self.current_stage.and_then(|stage| self.state(stage))
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.completed).count()
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Per-stage fold state. Borrows the records; nothing is copied until the
/// final `StageState` is built.
#[derive(Default)]
struct StageAccumulator<'r> {
    latest_completed: Option<&'r ActionRecord>,
    earliest: Option<&'r ActionRecord>,
    count: usize,
}

impl<'r> StageAccumulator<'r> {
    fn absorb(mut self, action: &'r ActionRecord) -> Self {
        self.count = self.count.saturating_add(1);
        if action.status.is_completed() {
            self.latest_completed = Some(match self.latest_completed {
                Some(current) if current.rank_key() >= action.rank_key() => current,
                _ => action,
            });
        }
        self.earliest = Some(match self.earliest {
            Some(current) if current.rank_key() <= action.rank_key() => current,
            _ => action,
        });
        self
    }
}

/// Places action records on catalog stages.
#[derive(Debug, Clone, Copy)]
pub struct StageResolver<'c> {
    catalog: &'c StageCatalog,
}

impl<'c> StageResolver<'c> {
    #[must_use]
    pub fn new(catalog: &'c StageCatalog) -> Self {
        Self { catalog }
    }

    /// Stage a single record belongs to, or `None` if it is unmapped.
    #[must_use]
    pub fn place(&self, action: &ActionRecord) -> Option<(StageNumber, Placement)> {
        let key = action
            .stage_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        if let Some(key) = key {
            return self
                .catalog
                .by_key(key)
                .map(|stage| (stage.number, Placement::StageKey));
        }

        let text = action
            .action_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())?;

        let candidates = self.catalog.keyword_candidates(text);
        let first = candidates.first()?;
        Some((
            first.stage,
            Placement::Keyword {
                phrase: first.phrase.clone(),
                candidates: candidates.len(),
            },
        ))
    }

    /// Resolve every stage of `case`.
    #[must_use]
    pub fn resolve(&self, case: &CaseSnapshot) -> StageResolution {
        let (placed, mut unmapped) = case.actions.iter().fold(
            (BTreeMap::<StageNumber, StageAccumulator<'_>>::new(), Vec::new()),
            |(mut placed, mut unmapped), action| {
                match self.place(action) {
                    Some((stage, placement)) => {
                        if placement.is_ambiguous() {
                            tracing::debug!(
                                case_id = %case.case_id,
                                stage = %stage,
                                ?placement,
                                "ambiguous keyword placement"
                            );
                        }
                        let acc = placed.remove(&stage).unwrap_or_default();
                        placed.insert(stage, acc.absorb(action));
                    }
                    None => {
                        tracing::warn!(
                            case_id = %case.case_id,
                            stage_key = ?action.stage_key,
                            action_type = ?action.action_type,
                            date = %action.action_date,
                            "unmapped action record"
                        );
                        unmapped.push(action.clone());
                    }
                }
                (placed, unmapped)
            },
        );
        unmapped.sort_by(|a, b| a.rank_key().cmp(&b.rank_key()));

        let stages: Vec<StageState> = self
            .catalog
            .stages()
            .iter()
            .map(|definition| {
                let acc = placed.get(&definition.number);
                let evidencing = acc.and_then(|a| a.latest_completed);
                let base_date = match (evidencing, acc.and_then(|a| a.earliest)) {
                    (Some(done), _) => Some(done.action_date),
                    (None, Some(first)) => Some(first.action_date),
                    (None, None) if definition.number == StageNumber::FIRST => case.start_date,
                    (None, None) => None,
                };
                StageState {
                    stage: definition.number,
                    completed: evidencing.is_some(),
                    evidencing_action: evidencing.cloned(),
                    base_date,
                    action_count: acc.map(|a| a.count).unwrap_or(0),
                }
            })
            .collect();

        let current_stage = stages.iter().find(|s| !s.completed).map(|s| s.stage);

        StageResolution {
            case_id: case.case_id.clone(),
            stages,
            current_stage,
            unmapped,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionStatus::{Completed, InProgress, Pending};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn catalog() -> StageCatalog {
        StageCatalog::standard().expect("standard catalog")
    }

    fn case() -> CaseSnapshot {
        CaseSnapshot::new(CaseId::new("C-7")).with_start_date(date(2026, 3, 2))
    }

    fn keyed(key: &str, d: NaiveDate, status: crate::CompletionStatus) -> ActionRecord {
        ActionRecord::keyed(CaseId::new("C-7"), key, d, status)
    }

    #[test]
    fn empty_case_starts_at_stage_one_with_start_date() {
        let catalog = catalog();
        let resolution = StageResolver::new(&catalog).resolve(&case());
        assert_eq!(resolution.current_stage, Some(StageNumber(1)));
        assert_eq!(
            resolution.current_state().and_then(|s| s.base_date),
            Some(date(2026, 3, 2))
        );
        assert_eq!(resolution.stages.len(), 8);
        assert!(resolution.stages[1..].iter().all(|s| s.base_date.is_none()));
    }

    #[test]
    fn exact_key_wins_over_keyword() {
        let catalog = catalog();
        let mut action = keyed("hearing", date(2026, 3, 3), Completed);
        action.action_type = Some("appeal filed".into());
        let placed = StageResolver::new(&catalog).place(&action);
        assert_eq!(placed, Some((StageNumber(4), Placement::StageKey)));
    }

    #[test]
    fn unknown_key_is_unmapped() {
        let catalog = catalog();
        let mut action = keyed("Witness interview", date(2026, 3, 3), Pending);
        assert!(StageResolver::new(&catalog).place(&action).is_none());

        // A type that would match the keyword table does not rescue a bad key.
        action.action_type = Some("hearing with student".into());
        assert!(StageResolver::new(&catalog).place(&action).is_none());
    }

    #[test]
    fn unknown_key_does_not_complete_a_stage() {
        let catalog = catalog();
        let snapshot = case()
            .with_action(keyed("initiation_notice", date(2026, 3, 2), Completed))
            .with_action(keyed("defense_statement_v2", date(2026, 3, 4), Completed));
        let resolution = StageResolver::new(&catalog).resolve(&snapshot);
        assert_eq!(resolution.unmapped.len(), 1);
        assert_eq!(resolution.current_stage, Some(StageNumber(2)));
    }

    #[test]
    fn keyword_applies_when_key_is_blank() {
        let catalog = catalog();
        let mut action = keyed("  ", date(2026, 3, 3), Pending);
        action.action_type = Some("Witness interview".into());
        let (stage, placement) = StageResolver::new(&catalog).place(&action).expect("placed");
        assert_eq!(stage, StageNumber(4));
        assert!(matches!(placement, Placement::Keyword { .. }));
    }

    #[test]
    fn current_stage_is_lowest_incomplete() {
        let catalog = catalog();
        let snapshot = case()
            .with_action(keyed("initiation_notice", date(2026, 3, 2), Completed))
            .with_action(keyed("investigation", date(2026, 3, 9), Completed));
        let resolution = StageResolver::new(&catalog).resolve(&snapshot);
        assert_eq!(resolution.current_stage, Some(StageNumber(2)));
        assert_eq!(resolution.completed_count(), 2);
    }

    #[test]
    fn incomplete_stage_clock_starts_at_first_record() {
        let catalog = catalog();
        let snapshot = case()
            .with_action(keyed("statement_of_defense", date(2026, 3, 6), InProgress))
            .with_action(keyed("statement_of_defense", date(2026, 3, 4), Pending));
        let resolution = StageResolver::new(&catalog).resolve(&snapshot);
        let state = resolution.state(StageNumber(2)).expect("stage 2");
        assert!(!state.completed);
        assert_eq!(state.base_date, Some(date(2026, 3, 4)));
        assert_eq!(state.action_count, 2);
    }

    #[test]
    fn resolution_ignores_input_order() {
        let catalog = catalog();
        let actions = vec![
            keyed("initiation_notice", date(2026, 3, 2), Completed),
            keyed("initiation_notice", date(2026, 3, 5), Completed),
            ActionRecord::typed(CaseId::new("C-7"), "phone call", date(2026, 3, 3), Pending),
            keyed("hearing", date(2026, 3, 4), Pending),
        ];
        let mut reversed = actions.clone();
        reversed.reverse();

        let resolver = StageResolver::new(&catalog);
        let mut a = case();
        a.actions = actions;
        let mut b = case();
        b.actions = reversed;
        assert_eq!(resolver.resolve(&a), resolver.resolve(&b));
    }

    #[test]
    fn unmapped_records_are_kept_for_audit() {
        let catalog = catalog();
        let snapshot = case().with_action(ActionRecord::typed(
            CaseId::new("C-7"),
            "met with parents",
            date(2026, 3, 3),
            Completed,
        ));
        let resolution = StageResolver::new(&catalog).resolve(&snapshot);
        assert_eq!(resolution.unmapped.len(), 1);
        assert_eq!(resolution.current_stage, Some(StageNumber(1)));
        assert_eq!(resolution.completed_count(), 0);
    }

    #[test]
    fn blank_key_and_type_are_unmapped() {
        let catalog = catalog();
        let mut action = keyed("   ", date(2026, 3, 3), Completed);
        action.action_type = Some(String::new());
        assert!(StageResolver::new(&catalog).place(&action).is_none());
    }
}
