//! # dueproc HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /stages` - The stage catalog
//! - `GET /calendar/{year}?regime=` - Non-business days of a configured year
//! - `POST /business-days` - Signed business-day count between two dates
//! - `POST /evaluate` - Per-stage deadlines of one case snapshot
//! - `POST /triage` - Triage the snapshots in the body (or the loaded source)
//! - `GET /triage?today=&regime=` - Triage the loaded source
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `DUEPROC_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `DUEPROC_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `DUEPROC_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use handlers::{
    business_days_handler, calendar_handler, evaluate_handler, health_handler, stages_handler,
    triage_get_handler, triage_post_handler,
};
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    BusinessDaysRequest, BusinessDaysResponse, CalendarResponse, ContextParams, EvaluateRequest,
    EvaluateResponse, HealthResponse, StagesResponse, TriageEntry, TriageRequest, TriageResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use chrono::NaiveDate;
use dueproc_core::{
    AlertClassifier, CaseSource, DeadlineEngine, DueProcessError, EvaluationContext, Regime,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: an immutable engine and a read-only case source.
///
/// Nothing here is mutated after startup, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DeadlineEngine>,
    pub classifier: AlertClassifier,
    pub source: Arc<dyn CaseSource>,
    /// Regime used when a request does not name one.
    pub default_regime: Regime,
    /// Pinned "today". `None` reads the local date on every request.
    pub today: Option<NaiveDate>,
}

impl AppState {
    /// Create new app state over an engine and a case source.
    #[must_use]
    pub fn new(engine: DeadlineEngine, source: Arc<dyn CaseSource>, default_regime: Regime) -> Self {
        Self {
            engine: Arc::new(engine),
            classifier: AlertClassifier::new(),
            source,
            default_regime,
            today: None,
        }
    }

    /// Pin "today" to a fixed date.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Use a custom classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: AlertClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Evaluation context for a request, falling back to server defaults.
    pub fn context(&self, params: &ContextParams) -> Result<EvaluationContext, DueProcessError> {
        let regime = params.parse_regime()?.unwrap_or(self.default_regime);
        let today = match params.parse_today()? {
            Some(today) => today,
            None => self
                .today
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        };
        Ok(EvaluationContext::new(today, regime))
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `DUEPROC_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins
/// - If not set: defaults to localhost only
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("DUEPROC_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (DUEPROC_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in DUEPROC_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No DUEPROC_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - if enabled
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set DUEPROC_API_KEY environment variable to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/stages", get(handlers::stages_handler))
        .route("/calendar/{year}", get(handlers::calendar_handler))
        .route("/business-days", post(handlers::business_days_handler))
        .route("/evaluate", post(handlers::evaluate_handler))
        .route(
            "/triage",
            get(handlers::triage_get_handler).post(handlers::triage_post_handler),
        );

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Triage batches arrive in the body.
    router
        .layer(axum::extract::DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), DueProcessError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DueProcessError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("dueproc HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| DueProcessError::IoError(format!("Server error: {}", e)))
}
