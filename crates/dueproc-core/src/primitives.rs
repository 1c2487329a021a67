//! # Engine Primitives
//!
//! Hardcoded constants of the deadline engine.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Number of stages in the due-process catalog.
pub const STAGE_COUNT: u8 = 8;

/// Upper bound (inclusive) of remaining business days classified as
/// "due soon". Anything above is "on track".
pub const DUE_SOON_THRESHOLD: i64 = 3;

/// Calendar dataset schema version understood by this build.
///
/// Increment this when the TOML layout of calendar datasets changes.
pub const CALENDAR_FORMAT_VERSION: u32 = 1;

/// Display name used for the two Easter-derived holidays.
pub const GOOD_FRIDAY_NAME: &str = "Good Friday";
pub const HOLY_SATURDAY_NAME: &str = "Holy Saturday";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of action records accepted for a single case.
pub const MAX_ACTIONS_PER_CASE: usize = 10_000;

/// Maximum number of cases accepted in one triage request.
pub const MAX_CASES_PER_BATCH: usize = 50_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_soon_window_is_three_days() {
        assert_eq!(DUE_SOON_THRESHOLD, 3);
    }

    #[test]
    fn catalog_has_eight_stages() {
        assert_eq!(STAGE_COUNT, 8);
    }
}
