use chrono::{DateTime, Timelike, Utc};

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Truncate an instant to its minute bucket (year, month, day, hour, minute).
pub fn minute_label(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

pub fn format_stamp(t: DateTime<Utc>) -> String {
    t.format(STAMP_FORMAT).to_string()
}

pub fn state_glyph(is_down: bool) -> &'static str {
    if is_down {
        "❌"
    } else {
        "🆙"
    }
}
