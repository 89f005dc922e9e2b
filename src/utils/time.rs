use crate::domain::model::DurationParts;
use chrono::{DateTime, Local, TimeZone, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %k:%M:%S";

/// Format a unix timestamp in local time. Out-of-range values are returned as-is.
pub fn unix_to_human(timestamp: i64, format: &str) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format(format).to_string(),
        None => timestamp.to_string(),
    }
}

pub fn get_timestamp(timestamp: i64) -> String {
    unix_to_human(timestamp, TIMESTAMP_FORMAT)
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

pub fn unix_time_in_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Reformat an RFC 3339 timestamp in local time, or hand back the input
/// when it does not parse.
pub fn prettify_timestamp(timestamp: &str, format: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.with_timezone(&Local).format(format).to_string(),
        Err(e) => {
            tracing::debug!("Could not parse timestamp {:?}: {}", timestamp, e);
            timestamp.to_string()
        }
    }
}

pub fn duration_breakdown(seconds: u64) -> DurationParts {
    DurationParts {
        days: seconds / 86_400,
        hours: (seconds % 86_400) / 3_600,
        minutes: (seconds % 3_600) / 60,
        seconds: seconds % 60,
    }
}

/// `3 days 04:05`, `1 day 00:10`, or just `04:05` under a day.
pub fn format_uptime(parts: &DurationParts) -> String {
    let mut uptime = Vec::new();
    if parts.days > 0 {
        let label = if parts.days == 1 { "day" } else { "days" };
        uptime.push(format!("{} {}", parts.days, label));
    }
    uptime.push(format!("{:02}:{:02}", parts.hours, parts.minutes));
    uptime.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_breakdown() {
        let parts = duration_breakdown(3 * 86_400 + 4 * 3_600 + 5 * 60 + 6);
        assert_eq!(
            parts,
            DurationParts {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6
            }
        );
        assert_eq!(duration_breakdown(59).seconds, 59);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(&duration_breakdown(3 * 86_400 + 4 * 3_600 + 5 * 60)), "3 days 04:05");
        assert_eq!(format_uptime(&duration_breakdown(86_400 + 600)), "1 day 00:10");
        assert_eq!(format_uptime(&duration_breakdown(3_660)), "01:01");
    }

    #[test]
    fn test_unix_to_human_uses_local_time() {
        let local = Local.with_ymd_and_hms(2024, 3, 9, 14, 7, 2).single().unwrap();
        assert_eq!(unix_to_human(local.timestamp(), "%Y-%m-%d"), "2024-03-09");
        assert_eq!(get_timestamp(local.timestamp()), "2024-03-09 14:07:02");
    }

    #[test]
    fn test_prettify_timestamp() {
        assert_eq!(prettify_timestamp("not a date", "%Y"), "not a date");
        let pretty = prettify_timestamp("2024-06-01T12:00:00Z", "%Y");
        assert_eq!(pretty, "2024");
    }
}
