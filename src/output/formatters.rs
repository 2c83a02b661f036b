//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Duration, Local, Utc};

/// Format a UTC instant in local time.
///
/// # Example output
/// `01/15/2025 14:30:05`
pub fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%m/%d/%Y %H:%M:%S")
        .to_string()
}

/// Format a remaining duration, coarsest two units only.
///
/// Returns "expired" for zero or negative durations.
///
/// # Example output
/// - `44d 23h`
/// - `2h 15m`
/// - `45s`
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds();
    if secs <= 0 {
        return "expired".to_string();
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
