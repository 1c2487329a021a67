//! # Business-Day Calendar
//!
//! Answers "is this date a business day" for a (year, regime) pair and
//! counts business days between two dates.
//!
//! ## Exclusion Rules
//!
//! Evaluated in this order:
//!
//! | Order | Reason | Source |
//! |-------|--------|--------|
//! | 1 | `Weekend` | Saturday and Sunday, always |
//! | 2 | `LegalHoliday` | fixed table per year + Good Friday / Holy Saturday |
//! | 3 | `InstitutionalRecess` | regime recess windows, inclusive |
//!
//! A date may carry several reasons at once (a recess Saturday is both
//! `Weekend` and `InstitutionalRecess`). Range queries emit every reason
//! as its own entry; `is_business_day` stops at the first.
//!
//! The exclusion table for each configured (year, regime) pair is built
//! once in [`CalendarProvider::from_dataset`] and never changes afterwards.
//! Asking about a year or regime with no data is a
//! [`DueProcessError::CalendarNotConfigured`] error; there is no fallback to
//! plain calendar-day arithmetic.

mod dataset;
mod easter;

pub use dataset::{CalendarDataset, HolidayEntry, RecessEntry, YearEntry};
pub use easter::{easter_holidays, easter_sunday};

use crate::primitives::{GOOD_FRIDAY_NAME, HOLY_SATURDAY_NAME};
use crate::{DueProcessError, Regime};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// NON-BUSINESS DAYS
// =============================================================================

/// Why a date is excluded from business-day counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Weekend,
    LegalHoliday,
    InstitutionalRecess,
}

impl ExclusionReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::Weekend => "weekend",
            ExclusionReason::LegalHoliday => "legal_holiday",
            ExclusionReason::InstitutionalRecess => "institutional_recess",
        }
    }
}

/// A single excluded calendar date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonBusinessDay {
    pub date: NaiveDate,
    pub reason: ExclusionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NonBusinessDay {
    fn new(date: NaiveDate, reason: ExclusionReason, name: Option<&str>) -> Self {
        Self {
            date,
            reason,
            name: name.map(str::to_string),
        }
    }
}

// =============================================================================
// YEAR CALENDAR
// =============================================================================

/// Precomputed exclusions of one year under one regime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCalendar {
    year: i32,
    regime: Regime,
    /// Every excluded date, with its reasons in rule order.
    exclusions: BTreeMap<NaiveDate, Vec<NonBusinessDay>>,
}

impl YearCalendar {
    fn build(entry: &YearEntry, regime: Regime) -> Result<Self, DueProcessError> {
        let year = entry.year;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| DueProcessError::InvalidDate(format!("year {}", year)))?;

        let mut exclusions: BTreeMap<NaiveDate, Vec<NonBusinessDay>> = BTreeMap::new();

        // Rule 1: weekends.
        for day in first.iter_days().take_while(|d| d.year() == year) {
            if is_weekend(day) {
                exclusions
                    .entry(day)
                    .or_default()
                    .push(NonBusinessDay::new(day, ExclusionReason::Weekend, None));
            }
        }

        // Rule 2: legal holidays, fixed table first, then Easter-derived.
        let [good_friday, holy_saturday] = easter_holidays(year)?;
        let fixed = entry.holidays.iter().map(|h| (h.date, h.name.as_str()));
        let floating = [
            (good_friday, GOOD_FRIDAY_NAME),
            (holy_saturday, HOLY_SATURDAY_NAME),
        ];
        for (date, name) in fixed.chain(floating) {
            let reasons = exclusions.entry(date).or_default();
            if reasons
                .iter()
                .any(|r| r.reason == ExclusionReason::LegalHoliday)
            {
                tracing::warn!(%date, name, year, "duplicate legal holiday ignored");
                continue;
            }
            reasons.push(NonBusinessDay::new(
                date,
                ExclusionReason::LegalHoliday,
                Some(name),
            ));
        }

        // Rule 3: recess windows of this regime.
        for window in entry.recess.iter().filter(|w| w.regime == regime) {
            for day in window.start.iter_days().take_while(|d| *d <= window.end) {
                let reasons = exclusions.entry(day).or_default();
                if reasons
                    .iter()
                    .any(|r| r.reason == ExclusionReason::InstitutionalRecess)
                {
                    continue;
                }
                reasons.push(NonBusinessDay::new(
                    day,
                    ExclusionReason::InstitutionalRecess,
                    Some(window.name.as_str()),
                ));
            }
        }

        Ok(Self {
            year,
            regime,
            exclusions,
        })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Whether `date` is a business day. Dates outside this year are
    /// reported as business days only if they carry no exclusion, so callers
    /// should go through [`CalendarProvider`].
    #[must_use]
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.exclusions.contains_key(&date)
    }

    /// Reasons `date` is excluded, in rule order. Empty for business days.
    #[must_use]
    pub fn reasons(&self, date: NaiveDate) -> &[NonBusinessDay] {
        self.exclusions.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All exclusions of the year in date order.
    pub fn non_business_days(&self) -> impl Iterator<Item = &NonBusinessDay> {
        self.exclusions.values().flatten()
    }

    /// Number of business days in the whole year.
    #[must_use]
    pub fn business_day_count(&self) -> usize {
        let days_in_year = NaiveDate::from_ymd_opt(self.year, 12, 31)
            .map(|d| d.ordinal() as usize)
            .unwrap_or(365);
        days_in_year.saturating_sub(self.exclusions.len())
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// =============================================================================
// CALENDAR PROVIDER
// =============================================================================

/// Business-day calendar for every configured (year, regime) pair.
///
/// Immutable after construction and cheap to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarProvider {
    jurisdiction: String,
    calendars: BTreeMap<(i32, Regime), YearCalendar>,
}

impl CalendarProvider {
    /// Build every (year, regime) table of a validated dataset.
    pub fn from_dataset(dataset: &CalendarDataset) -> Result<Self, DueProcessError> {
        dataset.validate()?;

        let mut calendars = BTreeMap::new();
        for entry in &dataset.years {
            for &regime in &entry.regimes {
                calendars.insert((entry.year, regime), YearCalendar::build(entry, regime)?);
            }
        }

        tracing::debug!(
            jurisdiction = %dataset.jurisdiction,
            tables = calendars.len(),
            "calendar built"
        );

        Ok(Self {
            jurisdiction: dataset.jurisdiction.clone(),
            calendars,
        })
    }

    /// Calendar backed by the dataset compiled into this build.
    pub fn builtin() -> Result<Self, DueProcessError> {
        Self::from_dataset(&CalendarDataset::builtin()?)
    }

    /// Parse a TOML dataset and build the calendar from it.
    pub fn from_toml_str(source: &str) -> Result<Self, DueProcessError> {
        Self::from_dataset(&CalendarDataset::from_toml_str(source)?)
    }

    #[must_use]
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Years configured for `regime`, ascending.
    #[must_use]
    pub fn configured_years(&self, regime: Regime) -> Vec<i32> {
        self.calendars
            .keys()
            .filter(|(_, r)| *r == regime)
            .map(|(year, _)| *year)
            .collect()
    }

    /// The precomputed table for one (year, regime) pair.
    pub fn year_calendar(&self, year: i32, regime: Regime) -> Result<&YearCalendar, DueProcessError> {
        self.calendars
            .get(&(year, regime))
            .ok_or(DueProcessError::CalendarNotConfigured { year, regime })
    }

    /// Whether `date` is a business day under `regime`.
    pub fn is_business_day(&self, date: NaiveDate, regime: Regime) -> Result<bool, DueProcessError> {
        let calendar = self.year_calendar(date.year(), regime)?;
        Ok(calendar.is_business_day(date))
    }

    /// Every exclusion between `start` and `end` inclusive, ordered by date
    /// and then by rule order. Empty when `start > end`.
    pub fn non_business_days_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        regime: Regime,
    ) -> Result<Vec<NonBusinessDay>, DueProcessError> {
        if start > end {
            return Ok(Vec::new());
        }

        let mut days = Vec::new();
        for year in start.year()..=end.year() {
            let calendar = self.year_calendar(year, regime)?;
            days.extend(
                calendar
                    .exclusions
                    .range(start..=end)
                    .flat_map(|(_, reasons)| reasons.iter().cloned()),
            );
        }
        Ok(days)
    }

    /// Signed number of business days from `start` to `end`.
    ///
    /// Walks one calendar day at a time toward `end`. Going forward, each
    /// date in `(start, end]` that is a business day adds one; going
    /// backward, each business day in `(end, start]` subtracts one. The
    /// result is therefore antisymmetric, and `start == end` is always 0
    /// whether or not that date is a business day.
    pub fn business_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        regime: Regime,
    ) -> Result<i64, DueProcessError> {
        if start == end {
            return Ok(0);
        }

        let (from, to, sign) = if start < end {
            (start, end, 1)
        } else {
            (end, start, -1)
        };

        let mut count: i64 = 0;
        let mut day = from;
        while day < to {
            day = day.succ_opt().ok_or_else(|| {
                DueProcessError::InvalidDate(format!("no day after {}", day))
            })?;
            if self.is_business_day(day, regime)? {
                count = count.saturating_add(1);
            }
        }

        Ok(sign * count)
    }
}

// =============================================================================
// TESTS
// =============================================================================
