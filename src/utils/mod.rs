//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format the time elapsed between `time` and `now` as "N seconds ago" or
/// "N minutes ago"
///
/// Future timestamps are treated as zero seconds ago.
pub fn format_since(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - time).num_seconds().max(0);

    if diff < 60 {
        return format!("{diff} second{} ago", plural(diff));
    }

    let minutes = diff / 60;
    format!("{minutes} minute{} ago", plural(minutes))
}

/// Format a duration as milliseconds, or seconds with two decimals above one second
pub fn format_ms(duration: Duration) -> String {
    let ms = duration.as_millis();

    if ms > 1000 {
        return format!("{:.2}s", duration.as_secs_f64());
    }

    format!("{ms}ms")
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
