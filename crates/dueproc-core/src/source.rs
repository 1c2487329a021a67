//! # Case Sources
//!
//! The read interface to whatever store owns the cases and their action
//! records. The engine only ever sees the snapshot a source returns; it never
//! writes back.

use crate::{CaseId, CaseSnapshot, DueProcessError};

/// Read-only access to case snapshots.
///
/// Implementations do their I/O here, before the engine runs. Each call
/// should return a fresh snapshot; callers re-run the full pipeline on it
/// rather than patching earlier results.
pub trait CaseSource: Send + Sync {
    /// Every case currently known to the source.
    fn load_cases(&self) -> Result<Vec<CaseSnapshot>, DueProcessError>;

    /// One case by id. The default scans [`CaseSource::load_cases`].
    fn load_case(&self, case_id: &CaseId) -> Result<Option<CaseSnapshot>, DueProcessError> {
        Ok(self
            .load_cases()?
            .into_iter()
            .find(|c| &c.case_id == case_id))
    }
}

/// A fixed set of snapshots held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseSource {
    cases: Vec<CaseSnapshot>,
}

impl InMemoryCaseSource {
    #[must_use]
    pub fn new(cases: Vec<CaseSnapshot>) -> Self {
        Self { cases }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseSource for InMemoryCaseSource {
    fn load_cases(&self) -> Result<Vec<CaseSnapshot>, DueProcessError> {
        Ok(self.cases.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_case_finds_by_id() {
        let source = InMemoryCaseSource::new(vec![
            CaseSnapshot::new(CaseId::new("A")),
            CaseSnapshot::new(CaseId::new("B")),
        ]);
        assert_eq!(source.len(), 2);
        let found = source.load_case(&CaseId::new("B")).expect("load");
        assert_eq!(found.map(|c| c.case_id), Some(CaseId::new("B")));
        assert!(source.load_case(&CaseId::new("Z")).expect("load").is_none());
    }
}
