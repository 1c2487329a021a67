//! # dueproc CLI Module
//!
//! ## Available Commands
//!
//! - `stages` - Print the stage catalog
//! - `calendar` - List non-business days of a year
//! - `business-days` - Signed business-day count between two dates
//! - `evaluate` - Per-stage deadlines of every case in a snapshot file
//! - `triage` - Sorted triage list of a snapshot file
//! - `server` - Start the HTTP server

mod commands;

use clap::{Parser, Subcommand};
use dueproc_core::DueProcessError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// dueproc - Due-process deadline tracker
///
/// Computes business-day deadlines and urgency for staged disciplinary
/// cases, against a holiday and recess calendar.
#[derive(Parser, Debug)]
#[command(name = "dueproc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Calendar dataset (TOML). Defaults to the builtin dataset.
    #[arg(short = 'C', long, global = true, env = "DUEPROC_CALENDAR")]
    pub calendar: Option<PathBuf>,

    /// Calendar regime: "semestral" or "trimestral"
    #[arg(short = 'R', long, global = true, default_value = "semestral")]
    pub regime: String,

    /// Evaluate as of this date (YYYY-MM-DD). Defaults to the local date.
    #[arg(short = 'T', long, global = true)]
    pub today: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Case snapshot file served by GET /triage
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Print the stage catalog
    Stages,

    /// List non-business days of a configured year
    Calendar {
        /// Year to list
        #[arg(short, long)]
        year: i32,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Signed business-day count between two dates
    BusinessDays {
        /// Start date (YYYY-MM-DD), not counted
        #[arg(long)]
        from: String,

        /// End date (YYYY-MM-DD), counted
        #[arg(long)]
        to: String,
    },

    /// Per-stage deadlines of every case in a snapshot file
    Evaluate {
        /// Case snapshot file (JSON array)
        #[arg(short, long)]
        file: PathBuf,

        /// Only evaluate this case
        #[arg(short, long)]
        case: Option<String>,
    },

    /// Sorted triage list of a snapshot file
    Triage {
        /// Case snapshot file (JSON array)
        #[arg(short, long)]
        file: PathBuf,

        /// Remaining business days still classified "due soon"
        #[arg(long)]
        due_soon: Option<i64>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DueProcessError> {
    let settings = Settings::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Server { file, host, port }) => {
            cmd_server(&settings, file.as_deref(), &host, port).await
        }
        Some(Commands::Stages) | None => cmd_stages(&settings),
        Some(Commands::Calendar { year, from, to }) => {
            cmd_calendar(&settings, year, from.as_deref(), to.as_deref())
        }
        Some(Commands::BusinessDays { from, to }) => cmd_business_days(&settings, &from, &to),
        Some(Commands::Evaluate { file, case }) => cmd_evaluate(&settings, &file, case.as_deref()),
        Some(Commands::Triage { file, due_soon }) => cmd_triage(&settings, &file, due_soon),
    }
}
