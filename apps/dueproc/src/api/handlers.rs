//! # API Endpoint Handlers
//!
//! Configuration errors (missing calendar year, unknown regime) answer 422;
//! malformed input answers 400; failures reading the case source answer 500.

use super::{
    AppState,
    types::{
        BusinessDaysRequest, BusinessDaysResponse, CalendarResponse, ContextParams,
        EvaluateRequest, EvaluateResponse, HealthResponse, StagesResponse, TriageEntry,
        TriageRequest, TriageResponse,
    },
};
use crate::source::validate_batch;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use dueproc_core::{CaseSnapshot, DueProcessError, TriageReport, build_triage, parse_date};

/// HTTP status for an engine error.
fn error_status(error: &DueProcessError) -> StatusCode {
    match error {
        e if e.is_configuration_error() => StatusCode::UNPROCESSABLE_ENTITY,
        DueProcessError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STAGES HANDLER
// =============================================================================

/// The stage catalog.
pub async fn stages_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stages = state.engine.catalog().stages().to_vec();
    (
        StatusCode::OK,
        Json(StagesResponse {
            count: stages.len(),
            stages,
        }),
    )
}

// =============================================================================
// CALENDAR HANDLER
// =============================================================================

/// Non-business days of one configured year.
pub async fn calendar_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(params): Query<ContextParams>,
) -> impl IntoResponse {
    let lookup = params
        .parse_regime()
        .map(|r| r.unwrap_or(state.default_regime))
        .and_then(|regime| state.engine.calendar().year_calendar(year, regime));

    match lookup {
        Ok(calendar) => (
            StatusCode::OK,
            Json(CalendarResponse {
                success: true,
                year,
                regime: Some(calendar.regime()),
                jurisdiction: Some(state.engine.calendar().jurisdiction().to_string()),
                business_day_count: Some(calendar.business_day_count()),
                non_business_days: calendar.non_business_days().cloned().collect(),
                error: None,
            }),
        ),
        Err(e) => (error_status(&e), Json(CalendarResponse::error(year, e.to_string()))),
    }
}

// =============================================================================
// BUSINESS DAYS HANDLER
// =============================================================================

/// Signed business-day count between two dates.
pub async fn business_days_handler(
    State(state): State<AppState>,
    Json(request): Json<BusinessDaysRequest>,
) -> impl IntoResponse {
    match count_business_days(&state, &request) {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (error_status(&e), Json(BusinessDaysResponse::error(e.to_string()))),
    }
}

fn count_business_days(
    state: &AppState,
    request: &BusinessDaysRequest,
) -> Result<BusinessDaysResponse, DueProcessError> {
    let from = parse_date(&request.from)?;
    let to = parse_date(&request.to)?;
    let regime = match request.regime.as_deref() {
        Some(r) => r.parse()?,
        None => state.default_regime,
    };
    let days = state
        .engine
        .calendar()
        .business_days_between(from, to, regime)?;
    Ok(BusinessDaysResponse::success(days, regime))
}

// =============================================================================
// EVALUATE HANDLER
// =============================================================================

/// Per-stage deadlines of one case snapshot.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let evaluated = validate_batch(std::slice::from_ref(&request.case))
        .and_then(|()| state.context(&request.context))
        .and_then(|ctx| state.engine.evaluate(&request.case, ctx));

    match evaluated {
        Ok(deadlines) => {
            let alert = state.classifier.assess(&deadlines);
            (
                StatusCode::OK,
                Json(EvaluateResponse::success(deadlines, alert.as_ref())),
            )
        }
        Err(e) => (error_status(&e), Json(EvaluateResponse::error(e.to_string()))),
    }
}

// =============================================================================
// TRIAGE HANDLERS
// =============================================================================

/// Triage the snapshots in the body, or the server's source when the body
/// names none.
pub async fn triage_post_handler(
    State(state): State<AppState>,
    Json(request): Json<TriageRequest>,
) -> impl IntoResponse {
    let cases = match request.cases {
        Some(cases) => validate_batch(&cases).map(|()| cases),
        None => load_source(&state).await,
    };
    respond_triage(&state, &request.context, cases).await
}

/// Triage the server's source.
pub async fn triage_get_handler(
    State(state): State<AppState>,
    Query(params): Query<ContextParams>,
) -> impl IntoResponse {
    let cases = load_source(&state).await;
    respond_triage(&state, &params, cases).await
}

/// Read the source off the async runtime; file sources block.
async fn load_source(state: &AppState) -> Result<Vec<CaseSnapshot>, DueProcessError> {
    let source = state.source.clone();
    tokio::task::spawn_blocking(move || source.load_cases())
        .await
        .map_err(|e| DueProcessError::IoError(format!("Case source task failed: {}", e)))?
}

async fn respond_triage(
    state: &AppState,
    params: &ContextParams,
    cases: Result<Vec<CaseSnapshot>, DueProcessError>,
) -> (StatusCode, Json<TriageResponse>) {
    let report = match cases.and_then(|cases| Ok((cases, state.context(params)?))) {
        Ok((cases, ctx)) => {
            let engine = state.engine.clone();
            let classifier = state.classifier;
            tokio::task::spawn_blocking(move || build_triage(&engine, &classifier, &cases, ctx))
                .await
                .map_err(|e| DueProcessError::IoError(format!("Triage task failed: {}", e)))
                .and_then(|report| report)
        }
        Err(e) => Err(e),
    };

    match report {
        Ok(report) => (StatusCode::OK, Json(triage_response(report))),
        Err(e) => {
            tracing::warn!(error = %e, "triage failed");
            (error_status(&e), Json(TriageResponse::error(e.to_string())))
        }
    }
}

fn triage_response(report: TriageReport) -> TriageResponse {
    TriageResponse {
        success: true,
        today: Some(report.today),
        regime: Some(report.regime),
        entries: report.entries.iter().map(TriageEntry::from).collect(),
        terminal: report.terminal,
        error: None,
    }
}
