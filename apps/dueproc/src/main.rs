//! # dueproc - Due-Process Deadline Tracker
//!
//! The main binary for the dueproc deadline engine.
//!
//! This application provides:
//! - CLI interface for calendar queries, evaluation and triage
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/dueproc (THE BINARY)                │
//! │                                                           │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  JSON file   │   │
//! │  │  (clap)     │    │   (axum)    │    │  case source │   │
//! │  └──────┬──────┘    └──────┬──────┘    └──────┬───────┘   │
//! │         │                  │                  │           │
//! │         └──────────────────┼──────────────────┘           │
//! │                            ▼                              │
//! │                    ┌───────────────┐                      │
//! │                    │ dueproc-core  │                      │
//! │                    │  (THE LOGIC)  │                      │
//! │                    └───────────────┘                      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Triage every case in a snapshot file
//! dueproc triage -f cases.json --regime trimestral
//!
//! # Count business days
//! dueproc business-days --from 2026-10-02 --to 2026-10-19
//!
//! # Start the HTTP server
//! dueproc server -f cases.json --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use dueproc::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // DUEPROC_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DUEPROC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dueproc=info,tower_http=debug".into());

    // Logs go to stderr so `--json-mode` output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the dueproc startup banner.
fn print_banner() {
    println!(
        r#"
  dueproc v{}
  Business-day deadlines for disciplinary due process
"#,
        env!("CARGO_PKG_VERSION")
    );
}
