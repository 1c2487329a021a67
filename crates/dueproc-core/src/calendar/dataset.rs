//! # Calendar Dataset
//!
//! The versioned, per-year holiday and recess data the calendar is built
//! from. Datasets are TOML documents:
//!
//! ```toml
//! format_version = 1
//! jurisdiction = "CL"
//!
//! [[years]]
//! year = 2026
//! regimes = ["semestral", "trimestral"]
//! holidays = [{ date = "2026-01-01", name = "New Year's Day" }]
//! recess = [{ regime = "semestral", start = "2026-06-22", end = "2026-07-03", name = "Winter recess" }]
//! ```
//!
//! Dates are quoted ISO strings. Good Friday and Holy Saturday are never
//! listed; they are computed from Easter. A recess window must lie within
//! its year; windows crossing New Year are split into two entries.

use crate::primitives::CALENDAR_FORMAT_VERSION;
use crate::{DueProcessError, Regime};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dataset compiled into the binary.
const BUILTIN_DATASET: &str = include_str!("../../data/calendar.toml");

/// A complete calendar dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDataset {
    pub format_version: u32,
    pub jurisdiction: String,
    #[serde(default)]
    pub years: Vec<YearEntry>,
}

/// Holiday and recess data for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: i32,
    /// Regimes this year carries data for. A (year, regime) pair not listed
    /// here is unconfigured.
    pub regimes: Vec<Regime>,
    #[serde(default)]
    pub holidays: Vec<HolidayEntry>,
    #[serde(default)]
    pub recess: Vec<RecessEntry>,
}

/// A fixed legal holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub date: NaiveDate,
    pub name: String,
}

/// An inclusive recess window for one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecessEntry {
    pub regime: Regime,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub name: String,
}

impl CalendarDataset {
    /// The dataset shipped with this build.
    pub fn builtin() -> Result<Self, DueProcessError> {
        Self::from_toml_str(BUILTIN_DATASET)
    }

    /// Parse and validate a TOML dataset.
    pub fn from_toml_str(source: &str) -> Result<Self, DueProcessError> {
        let dataset: CalendarDataset = toml::from_str(source)
            .map_err(|e| DueProcessError::CalendarConfig(format!("parse: {}", e)))?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check structural rules that serde cannot express.
    pub fn validate(&self) -> Result<(), DueProcessError> {
        if self.format_version != CALENDAR_FORMAT_VERSION {
            return Err(DueProcessError::CalendarConfig(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, CALENDAR_FORMAT_VERSION
            )));
        }

        let mut seen_years = BTreeSet::new();
        for entry in &self.years {
            if !seen_years.insert(entry.year) {
                return Err(DueProcessError::CalendarConfig(format!(
                    "year {} listed more than once",
                    entry.year
                )));
            }
            entry.validate()?;
        }
        Ok(())
    }
}

impl YearEntry {
    fn validate(&self) -> Result<(), DueProcessError> {
        if self.regimes.is_empty() {
            return Err(DueProcessError::CalendarConfig(format!(
                "year {} lists no regimes",
                self.year
            )));
        }

        for holiday in &self.holidays {
            if holiday.date.year() != self.year {
                return Err(DueProcessError::CalendarConfig(format!(
                    "holiday '{}' on {} is outside year {}",
                    holiday.name, holiday.date, self.year
                )));
            }
        }

        for window in &self.recess {
            if !self.regimes.contains(&window.regime) {
                return Err(DueProcessError::CalendarConfig(format!(
                    "recess '{}' in {} references unlisted regime {}",
                    window.name, self.year, window.regime
                )));
            }
            if window.start > window.end {
                return Err(DueProcessError::CalendarConfig(format!(
                    "recess '{}' in {} ends before it starts",
                    window.name, self.year
                )));
            }
            if window.start.year() != self.year || window.end.year() != self.year {
                return Err(DueProcessError::CalendarConfig(format!(
                    "recess '{}' crosses the boundary of year {}",
                    window.name, self.year
                )));
            }
        }
        Ok(())
    }
}
