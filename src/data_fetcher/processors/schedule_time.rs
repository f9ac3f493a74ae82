use crate::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a snooker.org schedule timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS` (both read as UTC),
/// RFC 3339 with an explicit offset, and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_schedule_time(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::datetime_parse_error("empty schedule timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| AppError::datetime_parse_error(format!("invalid date '{trimmed}'")));
    }

    Err(AppError::datetime_parse_error(format!(
        "unrecognized schedule timestamp '{trimmed}'"
    )))
}
