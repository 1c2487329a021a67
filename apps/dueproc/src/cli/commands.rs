//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command loads the calendar once, builds one engine, and reads
//! "today" once, so a single invocation is internally consistent.

use super::Cli;
use crate::api::{self, AppState};
use crate::source::{JsonFileCaseSource, load_calendar};
use chrono::{Datelike, NaiveDate};
use dueproc_core::{
    AlertClassifier, CaseDeadlines, CaseId, CaseSource, DeadlineEngine, DueProcessError,
    EvaluationContext, InMemoryCaseSource, Regime, StageCatalog, build_triage, parse_date,
    severity_label,
};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// SETTINGS
// =============================================================================

/// Global options resolved once per invocation.
pub struct Settings {
    pub engine: DeadlineEngine,
    pub regime: Regime,
    /// Date given with `--today`, if any.
    pub pinned_today: Option<NaiveDate>,
    pub json_mode: bool,
    pub verbose: bool,
}

impl Settings {
    /// Resolve global flags: parse regime and date, load the calendar.
    pub fn from_cli(cli: &Cli) -> Result<Self, DueProcessError> {
        let regime: Regime = cli.regime.parse()?;
        let pinned_today = cli.today.as_deref().map(parse_date).transpose()?;
        let calendar = load_calendar(cli.calendar.as_deref())?;
        let engine = DeadlineEngine::new(calendar, StageCatalog::standard()?);

        if cli.verbose {
            tracing::info!(
                %regime,
                jurisdiction = engine.calendar().jurisdiction(),
                years = ?engine.calendar().configured_years(regime),
                "calendar ready"
            );
        }

        Ok(Self {
            engine,
            regime,
            pinned_today,
            json_mode: cli.json_mode,
            verbose: cli.verbose,
        })
    }

    /// "today" for this invocation: `--today`, else the local date.
    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn context(&self) -> EvaluationContext {
        EvaluationContext::new(self.today(), self.regime)
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DueProcessError> {
    serde_json::to_value(value).map_err(|e| DueProcessError::SerializationError(e.to_string()))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    settings: &Settings,
    file: Option<&Path>,
    host: &str,
    port: u16,
) -> Result<(), DueProcessError> {
    let source: Arc<dyn CaseSource> = match file {
        Some(path) => Arc::new(JsonFileCaseSource::open(path)?),
        None => Arc::new(InMemoryCaseSource::default()),
    };

    println!("dueproc HTTP Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Regime:   {}", settings.regime);
    println!(
        "  Today:    {}",
        settings
            .pinned_today
            .map(|d| d.to_string())
            .unwrap_or_else(|| "local date".to_string())
    );
    println!(
        "  Cases:    {}",
        file.map(|f| f.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health            - Health check");
    println!("  GET  /stages            - Stage catalog");
    println!("  GET  /calendar/{{year}}   - Non-business days");
    println!("  POST /business-days     - Business-day count");
    println!("  POST /evaluate          - Evaluate one case");
    println!("  GET  /triage            - Triage loaded cases");
    println!("  POST /triage            - Triage posted cases");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let mut state = AppState::new(settings.engine.clone(), source, settings.regime);
    if let Some(today) = settings.pinned_today {
        state = state.with_today(today);
    }

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// Print the stage catalog.
pub fn cmd_stages(settings: &Settings) -> Result<(), DueProcessError> {
    let catalog = settings.engine.catalog();

    if settings.json_mode {
        print_json(&serde_json::json!({
            "count": catalog.len(),
            "stages": to_json(&catalog.stages())?,
        }));
        return Ok(());
    }

    println!("Due-Process Stages");
    println!("==================");
    for stage in catalog.stages() {
        let sla = stage
            .default_sla
            .map(|d| format!("{} business days", d))
            .unwrap_or_else(|| "no deadline".to_string());
        println!(
            "{:>2}. {:<22} {:<28} {}",
            stage.number, stage.key, stage.title, sla
        );
    }

    if settings.verbose {
        println!();
        println!("Keyword fallback (first match wins):");
        for rule in catalog.keywords() {
            println!("  {:<22} -> {}", rule.phrase, rule.stage);
        }
    }

    Ok(())
}

// =============================================================================
// CALENDAR COMMAND
// =============================================================================

/// List non-business days between two dates of the calendar.
pub fn cmd_calendar(
    settings: &Settings,
    year: i32,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(), DueProcessError> {
    let year_bound = |month, day| {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DueProcessError::InvalidDate(format!("year {}", year)))
    };
    let start = match from {
        Some(s) => parse_date(s)?,
        None => year_bound(1, 1)?,
    };
    let end = match to {
        Some(s) => parse_date(s)?,
        None => year_bound(12, 31)?,
    };

    let days = settings
        .engine
        .calendar()
        .non_business_days_in_range(start, end, settings.regime)?;

    if settings.json_mode {
        print_json(&serde_json::json!({
            "jurisdiction": settings.engine.calendar().jurisdiction(),
            "regime": settings.regime,
            "from": start,
            "to": end,
            "non_business_days": to_json(&days)?,
        }));
        return Ok(());
    }

    println!(
        "Non-business days {} .. {} ({}, {})",
        start,
        end,
        settings.engine.calendar().jurisdiction(),
        settings.regime
    );
    println!("==========================================");
    for day in &days {
        println!(
            "{}  {}  {:<20} {}",
            day.date,
            day.date.weekday(),
            day.reason.as_str(),
            day.name.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("{} exclusions", days.len());

    Ok(())
}

// =============================================================================
// BUSINESS DAYS COMMAND
// =============================================================================

/// Print the signed business-day count from `from` to `to`.
pub fn cmd_business_days(settings: &Settings, from: &str, to: &str) -> Result<(), DueProcessError> {
    let start = parse_date(from)?;
    let end = parse_date(to)?;
    let count = settings
        .engine
        .calendar()
        .business_days_between(start, end, settings.regime)?;

    if settings.json_mode {
        print_json(&serde_json::json!({
            "from": start,
            "to": end,
            "regime": settings.regime,
            "business_days": count,
        }));
        return Ok(());
    }

    println!(
        "{} business days from {} to {} ({})",
        count, start, end, settings.regime
    );
    Ok(())
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Evaluate every case in a snapshot file (or only `case_id`).
pub fn cmd_evaluate(
    settings: &Settings,
    file: &Path,
    case_id: Option<&str>,
) -> Result<(), DueProcessError> {
    let source = JsonFileCaseSource::open(file)?;
    let cases = match case_id {
        Some(id) => {
            let id = CaseId::new(id);
            let case = source.load_case(&id)?.ok_or_else(|| {
                DueProcessError::SerializationError(format!("Case {} not found", id))
            })?;
            vec![case]
        }
        None => source.load_cases()?,
    };

    let ctx = settings.context();
    let evaluated = cases
        .iter()
        .map(|case| settings.engine.evaluate(case, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    if settings.json_mode {
        print_json(&to_json(&evaluated)?);
        return Ok(());
    }

    for deadlines in &evaluated {
        print_case(settings, deadlines);
    }
    Ok(())
}

fn print_case(settings: &Settings, deadlines: &CaseDeadlines) {
    let catalog = settings.engine.catalog();
    let status = match AlertClassifier::new().assess(deadlines) {
        Some(alert) => severity_label(&alert.severity),
        None => "closed (all stages completed)".to_string(),
    };

    println!(
        "Case {} as of {} ({}): {}",
        deadlines.case_id, deadlines.today, deadlines.regime, status
    );
    println!("------------------------------------------------------------");
    for result in &deadlines.stages {
        let marker = if Some(result.stage) == deadlines.current_stage {
            ">"
        } else if result.completed {
            "x"
        } else {
            " "
        };
        let title = catalog
            .get(result.stage)
            .map(|s| s.title.as_str())
            .unwrap_or("");
        let opt = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{} {:>2} {:<28} base {:<10}  sla {:>3}  elapsed {:>3}  left {:>3}",
            marker,
            result.stage,
            title,
            result
                .base_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            opt(result.effective_sla),
            opt(result.business_days_elapsed),
            opt(result.days_remaining),
        );
    }

    if !deadlines.unmapped.is_empty() {
        println!("  {} unmapped action record(s)", deadlines.unmapped.len());
        if settings.verbose {
            for action in &deadlines.unmapped {
                println!(
                    "    {}  key={:?} type={:?}",
                    action.action_date, action.stage_key, action.action_type
                );
            }
        }
    }
    println!();
}

// =============================================================================
// TRIAGE COMMAND
// =============================================================================

/// Print the sorted triage list of a snapshot file.
pub fn cmd_triage(
    settings: &Settings,
    file: &Path,
    due_soon: Option<i64>,
) -> Result<(), DueProcessError> {
    let cases = JsonFileCaseSource::open(file)?.load_cases()?;
    let classifier = due_soon
        .map(AlertClassifier::with_due_soon_threshold)
        .unwrap_or_default();
    let report = build_triage(&settings.engine, &classifier, &cases, settings.context())?;

    if settings.json_mode {
        let entries: Vec<api::TriageEntry> =
            report.entries.iter().map(api::TriageEntry::from).collect();
        print_json(&serde_json::json!({
            "today": report.today,
            "regime": report.regime,
            "entries": to_json(&entries)?,
            "terminal": to_json(&report.terminal)?,
        }));
        return Ok(());
    }

    println!("Triage as of {} ({})", report.today, report.regime);
    println!("==========================================");
    for entry in &report.entries {
        println!(
            "{:<16} stage {:>2}  {}",
            entry.case_id.as_str(),
            entry.current_stage,
            severity_label(&entry.severity)
        );
    }
    if !report.terminal.is_empty() {
        println!();
        println!("{} closed case(s) not listed", report.terminal.len());
    }

    Ok(())
}
