//! # Stage Catalog
//!
//! The fixed, ordered list of due-process stages and the keyword table used
//! to place action records that carry no stage key.
//!
//! ## Standard Catalog
//!
//! | # | Key | Default SLA (business days) |
//! |---|-----|-----------------------------|
//! | 1 | `initiation_notice` | 2 |
//! | 2 | `statement_of_defense` | 5 |
//! | 3 | `investigation` | 10 |
//! | 4 | `hearing` | 5 |
//! | 5 | `resolution` | 10 |
//! | 6 | `resolution_notice` | 2 |
//! | 7 | `appeal` | 15 |
//! | 8 | `closure` | none |
//!
//! ## Keyword Fallback
//!
//! Rules are evaluated top to bottom and the first phrase contained in the
//! (lowercased) action type wins. Phrases overlap: "notification of
//! resolution" matches `resolution` (stage 5) before `notification`
//! (stage 1) even though it describes stage 6. The order is kept as is;
//! it is not assumed to be semantically right.

use crate::{DueProcessError, StageNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// STAGE DEFINITION
// =============================================================================

/// One step of the due process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub number: StageNumber,
    /// Stable identifier matched against `ActionRecord::stage_key`.
    pub key: String,
    pub title: String,
    /// Default SLA in business days. `None` means the stage has no deadline.
    pub default_sla: Option<u32>,
}

impl StageDefinition {
    #[must_use]
    pub fn new(
        number: u8,
        key: impl Into<String>,
        title: impl Into<String>,
        default_sla: Option<u32>,
    ) -> Self {
        Self {
            number: StageNumber(number),
            key: key.into(),
            title: title.into(),
            default_sla,
        }
    }
}

/// A fallback rule: an action type containing `phrase` maps to `stage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub phrase: String,
    pub stage: StageNumber,
}

impl KeywordRule {
    #[must_use]
    pub fn new(phrase: &str, stage: u8) -> Self {
        Self {
            phrase: phrase.to_lowercase(),
            stage: StageNumber(stage),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Ordered, read-only stage catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
    keywords: Vec<KeywordRule>,
}

impl StageCatalog {
    /// Build a catalog, rejecting anything but stages numbered 1..=N in
    /// order with unique, non-empty keys.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, DueProcessError> {
        if stages.is_empty() {
            return Err(DueProcessError::InvalidCatalog("catalog is empty".into()));
        }

        let mut keys = BTreeSet::new();
        for (index, stage) in stages.iter().enumerate() {
            let expected = index + 1;
            if stage.number.value() as usize != expected {
                return Err(DueProcessError::InvalidCatalog(format!(
                    "stage at position {} is numbered {} (expected {})",
                    index, stage.number, expected
                )));
            }
            if stage.key.trim().is_empty() {
                return Err(DueProcessError::InvalidCatalog(format!(
                    "stage {} has an empty key",
                    stage.number
                )));
            }
            if !keys.insert(stage.key.as_str()) {
                return Err(DueProcessError::InvalidCatalog(format!(
                    "duplicate stage key '{}'",
                    stage.key
                )));
            }
        }

        Ok(Self {
            stages,
            keywords: Vec::new(),
        })
    }

    /// Attach the keyword fallback table. Every rule must point at an
    /// existing stage and carry a non-empty phrase.
    pub fn with_keywords(mut self, keywords: Vec<KeywordRule>) -> Result<Self, DueProcessError> {
        for rule in &keywords {
            if rule.phrase.trim().is_empty() {
                return Err(DueProcessError::InvalidCatalog(
                    "keyword rule with empty phrase".into(),
                ));
            }
            if self.get(rule.stage).is_none() {
                return Err(DueProcessError::InvalidCatalog(format!(
                    "keyword '{}' points at unknown stage {}",
                    rule.phrase, rule.stage
                )));
            }
        }
        self.keywords = keywords;
        Ok(self)
    }

    /// The standard eight-stage disciplinary catalog with its keyword table.
    pub fn standard() -> Result<Self, DueProcessError> {
        let stages = vec![
            StageDefinition::new(1, "initiation_notice", "Notice of initiation", Some(2)),
            StageDefinition::new(2, "statement_of_defense", "Statement of defense", Some(5)),
            StageDefinition::new(3, "investigation", "Investigation", Some(10)),
            StageDefinition::new(4, "hearing", "Hearing", Some(5)),
            StageDefinition::new(5, "resolution", "Resolution", Some(10)),
            StageDefinition::new(6, "resolution_notice", "Notice of resolution", Some(2)),
            StageDefinition::new(7, "appeal", "Appeal", Some(15)),
            StageDefinition::new(8, "closure", "Closure and follow-up", None),
        ];
        Self::new(stages)?.with_keywords(standard_keywords())
    }

    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    #[must_use]
    pub fn keywords(&self) -> &[KeywordRule] {
        &self.keywords
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: construction rejects empty catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a stage by number.
    #[must_use]
    pub fn get(&self, number: StageNumber) -> Option<&StageDefinition> {
        let index = (number.value() as usize).checked_sub(1)?;
        self.stages.get(index)
    }

    /// Look up a stage by exact key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.key == key)
    }

    /// First keyword rule whose phrase occurs in `text`.
    #[must_use]
    pub fn match_keyword(&self, text: &str) -> Option<&KeywordRule> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|rule| lowered.contains(rule.phrase.as_str()))
    }

    /// Every keyword rule whose phrase occurs in `text`, in table order.
    /// More than one entry means the match was ambiguous.
    #[must_use]
    pub fn keyword_candidates(&self, text: &str) -> Vec<&KeywordRule> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|rule| lowered.contains(rule.phrase.as_str()))
            .collect()
    }
}

fn standard_keywords() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new("resolution notice", 6),
        KeywordRule::new("notice of resolution", 6),
        KeywordRule::new("appeal", 7),
        KeywordRule::new("reconsideration", 7),
        KeywordRule::new("closure", 8),
        KeywordRule::new("follow-up", 8),
        KeywordRule::new("follow up", 8),
        KeywordRule::new("resolution", 5),
        KeywordRule::new("sanction", 5),
        KeywordRule::new("decision", 5),
        KeywordRule::new("hearing", 4),
        KeywordRule::new("interview", 4),
        KeywordRule::new("investigation", 3),
        KeywordRule::new("evidence", 3),
        KeywordRule::new("witness", 3),
        KeywordRule::new("defense", 2),
        KeywordRule::new("statement", 2),
        KeywordRule::new("initiation", 1),
        KeywordRule::new("notification", 1),
        KeywordRule::new("notice", 1),
    ]
}

// =============================================================================
// TESTS
// =============================================================================
