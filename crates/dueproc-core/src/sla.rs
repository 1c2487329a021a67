//! # SLA Resolution
//!
//! Decides how many business days a stage is allowed. SLA data can come
//! from three places, reconciled here so callers never have to know which
//! one is authoritative. First match wins:
//!
//! 1. an override giving a day count for the stage;
//! 2. an override giving a due date, when the stage's base date is known
//!    (`business_days_between(base_date, due_date)`);
//! 3. the catalog default;
//! 4. nothing: the stage has no deadline.
//!
//! When several overrides of the same kind target one stage, the last one
//! in the list supersedes the others.
//!
//! A due date before the base date yields a negative SLA. That is kept: it
//! means the stage was overdue the moment it started.

use crate::calendar::CalendarProvider;
use crate::catalog::StageCatalog;
use crate::{DueProcessError, Regime, SlaOverride, SlaSpec, StageNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where an effective SLA came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaSource {
    Override,
    DueDate,
    CatalogDefault,
}

/// Resolved SLA of a stage, in business days (may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSla {
    pub days: i64,
    pub source: SlaSource,
}

/// Per-stage inputs to SLA resolution.
#[derive(Debug, Clone, Copy)]
pub struct SlaContext<'a> {
    pub overrides: &'a [SlaOverride],
    pub base_date: Option<NaiveDate>,
    pub regime: Regime,
}

pub struct SlaResolver<'a> {
    catalog: &'a StageCatalog,
    calendar: &'a CalendarProvider,
}

impl<'a> SlaResolver<'a> {
    #[must_use]
    pub fn new(catalog: &'a StageCatalog, calendar: &'a CalendarProvider) -> Self {
        Self { catalog, calendar }
    }

    /// Effective SLA for `stage`, or `None` when the stage has no deadline.
    ///
    /// Fails only when deriving a count from a due date needs calendar data
    /// that is not configured.
    pub fn effective_sla(
        &self,
        stage: StageNumber,
        ctx: &SlaContext<'_>,
    ) -> Result<Option<EffectiveSla>, DueProcessError> {
        let overrides = ctx.overrides;
        let for_stage = || overrides.iter().filter(move |o| o.stage == stage).rev();

        let explicit_days = for_stage().find_map(|o| match o.sla {
            SlaSpec::Days(days) => Some(days),
            SlaSpec::DueDate(_) => None,
        });
        if let Some(days) = explicit_days {
            return Ok(Some(EffectiveSla {
                days,
                source: SlaSource::Override,
            }));
        }

        let due_date = for_stage().find_map(|o| match o.sla {
            SlaSpec::DueDate(date) => Some(date),
            SlaSpec::Days(_) => None,
        });
        if let (Some(due), Some(base)) = (due_date, ctx.base_date) {
            let days = self.calendar.business_days_between(base, due, ctx.regime)?;
            if days < 0 {
                tracing::debug!(%stage, %base, %due, days, "due date precedes base date");
            }
            return Ok(Some(EffectiveSla {
                days,
                source: SlaSource::DueDate,
            }));
        }

        Ok(self
            .catalog
            .get(stage)
            .and_then(|definition| definition.default_sla)
            .map(|days| EffectiveSla {
                days: i64::from(days),
                source: SlaSource::CatalogDefault,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    struct Fixture {
        catalog: StageCatalog,
        calendar: CalendarProvider,
    }

    fn fixture() -> Fixture {
        Fixture {
            catalog: StageCatalog::standard().expect("catalog"),
            calendar: CalendarProvider::builtin().expect("calendar"),
        }
    }

    fn ctx(overrides: &[SlaOverride], base_date: Option<NaiveDate>) -> SlaContext<'_> {
        SlaContext {
            overrides,
            base_date,
            regime: Regime::Semestral,
        }
    }

    #[test]
    fn explicit_days_beat_due_date() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let overrides = [
            SlaOverride::due_date(StageNumber(3), date(2026, 3, 20)),
            SlaOverride::days(StageNumber(3), 4),
        ];
        let sla = resolver
            .effective_sla(StageNumber(3), &ctx(&overrides, Some(date(2026, 3, 2))))
            .expect("sla");
        assert_eq!(
            sla,
            Some(EffectiveSla {
                days: 4,
                source: SlaSource::Override
            })
        );
    }

    #[test]
    fn due_date_is_converted_to_business_days() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        // Mon 2026-03-02 -> Mon 2026-03-16: ten business days.
        let overrides = [SlaOverride::due_date(StageNumber(3), date(2026, 3, 16))];
        let sla = resolver
            .effective_sla(StageNumber(3), &ctx(&overrides, Some(date(2026, 3, 2))))
            .expect("sla")
            .expect("some");
        assert_eq!(sla.days, 10);
        assert_eq!(sla.source, SlaSource::DueDate);
    }

    #[test]
    fn due_date_without_base_falls_back_to_default() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let overrides = [SlaOverride::due_date(StageNumber(3), date(2026, 3, 16))];
        let sla = resolver
            .effective_sla(StageNumber(3), &ctx(&overrides, None))
            .expect("sla")
            .expect("some");
        assert_eq!(sla.days, 10);
        assert_eq!(sla.source, SlaSource::CatalogDefault);
    }

    #[test]
    fn due_date_before_base_is_negative() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let overrides = [SlaOverride::due_date(StageNumber(2), date(2026, 3, 2))];
        let sla = resolver
            .effective_sla(StageNumber(2), &ctx(&overrides, Some(date(2026, 3, 4))))
            .expect("sla")
            .expect("some");
        assert_eq!(sla.days, -2);
    }

    #[test]
    fn stage_without_default_has_no_deadline() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let sla = resolver
            .effective_sla(StageNumber(8), &ctx(&[], Some(date(2026, 3, 4))))
            .expect("sla");
        assert_eq!(sla, None);
    }

    #[test]
    fn later_override_supersedes_earlier() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let overrides = [
            SlaOverride::days(StageNumber(1), 9),
            SlaOverride::days(StageNumber(1), 3),
            SlaOverride::days(StageNumber(2), 40),
        ];
        let sla = resolver
            .effective_sla(StageNumber(1), &ctx(&overrides, None))
            .expect("sla")
            .expect("some");
        assert_eq!(sla.days, 3);
    }

    #[test]
    fn due_date_in_unconfigured_year_is_an_error() {
        let f = fixture();
        let resolver = SlaResolver::new(&f.catalog, &f.calendar);
        let overrides = [SlaOverride::due_date(StageNumber(3), date(2031, 1, 10))];
        let err = resolver
            .effective_sla(StageNumber(3), &ctx(&overrides, Some(date(2026, 12, 1))))
            .expect_err("2027+ not configured");
        assert!(err.is_configuration_error());
    }
}
