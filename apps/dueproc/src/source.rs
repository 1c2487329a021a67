//! # File-Backed Sources
//!
//! Reads case snapshots and calendar datasets from disk.
//!
//! Every path is canonicalized and size-checked before it is read, and every
//! batch of snapshots is checked against the engine's input limits before it
//! reaches the pipeline.

use dueproc_core::{
    CalendarProvider, CaseSnapshot, CaseSource, DueProcessError,
    primitives::{MAX_ACTIONS_PER_CASE, MAX_CASES_PER_BATCH},
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a case snapshot file (64 MB).
pub const MAX_CASES_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Maximum size of a calendar dataset file (1 MB).
pub const MAX_CALENDAR_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires it to
/// name an existing regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, DueProcessError> {
    let canonical = path.canonicalize().map_err(|e| {
        DueProcessError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(DueProcessError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate file size before reading.
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<(), DueProcessError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| DueProcessError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(DueProcessError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

fn read_bounded(path: &Path, max_size: u64) -> Result<String, DueProcessError> {
    validate_file_size(path, max_size)?;
    std::fs::read_to_string(path)
        .map_err(|e| DueProcessError::IoError(format!("Read '{}': {}", path.display(), e)))
}

/// Check a batch of snapshots against the engine's input limits.
pub fn validate_batch(cases: &[CaseSnapshot]) -> Result<(), DueProcessError> {
    if cases.len() > MAX_CASES_PER_BATCH {
        return Err(DueProcessError::SerializationError(format!(
            "Case count {} exceeds maximum {}",
            cases.len(),
            MAX_CASES_PER_BATCH
        )));
    }
    if let Some(case) = cases.iter().find(|c| c.actions.len() > MAX_ACTIONS_PER_CASE) {
        return Err(DueProcessError::SerializationError(format!(
            "Case {} has {} action records, maximum is {}",
            case.case_id,
            case.actions.len(),
            MAX_ACTIONS_PER_CASE
        )));
    }
    Ok(())
}

// =============================================================================
// CALENDAR
// =============================================================================

/// Load the calendar dataset at `path`, or the builtin one when `None`.
pub fn load_calendar(path: Option<&Path>) -> Result<CalendarProvider, DueProcessError> {
    match path {
        Some(path) => {
            let validated = validate_file_path(path)?;
            let source = read_bounded(&validated, MAX_CALENDAR_FILE_SIZE)?;
            let provider = CalendarProvider::from_toml_str(&source)?;
            tracing::info!(
                path = %validated.display(),
                jurisdiction = provider.jurisdiction(),
                "calendar dataset loaded"
            );
            Ok(provider)
        }
        None => CalendarProvider::builtin(),
    }
}

// =============================================================================
// JSON FILE CASE SOURCE
// =============================================================================

/// Case snapshots stored as a JSON array in one file.
///
/// The file is re-read on every call so a long-running server always sees
/// the current export of the record store.
#[derive(Debug, Clone)]
pub struct JsonFileCaseSource {
    path: PathBuf,
}

impl JsonFileCaseSource {
    /// Open a source over an existing file.
    pub fn open(path: &Path) -> Result<Self, DueProcessError> {
        Ok(Self {
            path: validate_file_path(path)?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaseSource for JsonFileCaseSource {
    fn load_cases(&self) -> Result<Vec<CaseSnapshot>, DueProcessError> {
        let contents = read_bounded(&self.path, MAX_CASES_FILE_SIZE)?;
        let cases: Vec<CaseSnapshot> = serde_json::from_str(&contents).map_err(|e| {
            DueProcessError::SerializationError(format!(
                "Parse '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        validate_batch(&cases)?;
        tracing::debug!(path = %self.path.display(), cases = cases.len(), "case snapshots loaded");
        Ok(cases)
    }
}

// =============================================================================
// TESTS
// =============================================================================
