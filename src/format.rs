use std::time::Duration;

/// Placeholder shown for a missing time
pub const NO_TIME: &str = "-";

/// Formats a lap or sector time as `M:SS.mmm`, rounded to the millisecond.
pub fn format_duration(duration: Duration) -> String {
    let total_millis = (duration.as_micros() + 500) / 1000;
    let minutes = total_millis / 60_000;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{}:{:02}.{:03}", minutes, seconds, millis)
}

pub fn format_optional_duration(duration: Option<Duration>) -> String {
    duration
        .map(format_duration)
        .unwrap_or_else(|| NO_TIME.to_string())
}
