//! Short display strings for time until departure.

use chrono::TimeDelta;

/// Magnitudes considered, largest first. Live departures never need days.
static MAGNITUDES: &[(&str, i64)] = &[("hr", 60 * 60), ("min", 60)];

/// Formats a time span as e.g. `"1 hr 4 min"`, or `"Due"` when it is a
/// minute or less away.
///
/// Whole seconds are used, truncated toward zero. A magnitude is only emitted
/// when the remaining seconds strictly exceed its unit, so exactly one hour
/// renders as `"60 min"` and exactly one minute as `"Due"`. Past departures
/// (negative spans) also render as `"Due"`.
pub fn human_duration(delta: TimeDelta) -> String {
    let mut seconds = delta.num_seconds();
    let mut parts = Vec::new();

    for (name, unit) in MAGNITUDES {
        if seconds > *unit {
            parts.push(format!("{} {}", seconds / unit, name));
            seconds %= unit;
        }
    }

    if parts.is_empty() {
        return "Due".to_string();
    }

    parts.join(" ")
}
