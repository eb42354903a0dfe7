use chrono::{DateTime, Local, Utc};
use colored::*;
use humansize::{format_size, BINARY};

/// Format a byte count in human-readable binary units (KiB, MiB, ...)
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Format a timestamp in local time (YYYY-MM-DD HH:MM:SS)
pub fn format_time(time: DateTime<Utc>) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a duration in seconds as "3d 4h 12m"
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Percentage colored against a threshold: red above it, yellow within 10 points
pub fn format_percent(value: f32, threshold: f32) -> ColoredString {
    let text = format!("{:5.1}%", value);
    if value > threshold {
        text.red().bold()
    } else if value > threshold - 10.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Truncate a string to `max` characters, adding an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
