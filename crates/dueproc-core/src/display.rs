//! # Display Labels
//!
//! Short iconographic labels for triage severities. Kept apart from
//! [`crate::alert`] so the taxonomy stays free of presentation; callers may
//! swap these strings for localized ones as long as the five buckets and
//! their order are preserved.

use crate::alert::{AlertBucket, AlertSeverity};

/// Icon shown in front of each bucket's label.
#[must_use]
pub fn bucket_icon(bucket: AlertBucket) -> &'static str {
    match bucket {
        AlertBucket::Overdue => "🔴",
        AlertBucket::DueToday => "🟠",
        AlertBucket::DueSoon => "🟡",
        AlertBucket::OnTrack => "🟢",
        AlertBucket::NoDeadline => "⚪",
    }
}

/// Human-readable label, e.g. `🔴 3 business days overdue`.
#[must_use]
pub fn severity_label(severity: &AlertSeverity) -> String {
    let icon = bucket_icon(severity.bucket());
    match severity {
        AlertSeverity::Overdue { days_overdue } => {
            format!("{} {} overdue", icon, business_days(*days_overdue))
        }
        AlertSeverity::DueToday => format!("{} Due today", icon),
        AlertSeverity::DueSoon { days_remaining } | AlertSeverity::OnTrack { days_remaining } => {
            format!("{} {} left", icon, business_days(*days_remaining))
        }
        AlertSeverity::NoDeadline => format!("{} No deadline", icon),
    }
}

fn business_days(n: i64) -> String {
    if n == 1 {
        "1 business day".to_string()
    } else {
        format!("{} business days", n)
    }
}
