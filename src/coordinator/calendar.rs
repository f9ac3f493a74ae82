//! Calendar projection of the upcoming matches snapshot.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::constants::calendar::DEFAULT_MATCH_DURATION_HOURS;
use crate::constants::placeholders::UNKNOWN;
use crate::data_fetcher::models::{EventRow, EventsPayload, TourType, UpcomingPayload};
use crate::data_fetcher::processors::parse_schedule_time;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub tour: TourType,
    pub match_id: i64,
}

fn or_unknown(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

/// `"<event> - <type> - <city> - <venue>"` with `Unknown` for missing parts
pub fn describe_event(event: Option<&EventRow>) -> String {
    format!(
        "{} - {} - {} - {}",
        or_unknown(event.map(|e| e.name.as_str())),
        or_unknown(event.map(|e| e.event_type.as_str())),
        or_unknown(event.map(|e| e.city.as_str())),
        or_unknown(event.map(|e| e.venue.as_str())),
    )
}

/// Projects upcoming matches starting in `[window_start, window_end)` onto calendar entries.
///
/// Matches whose scheduled date cannot be parsed are left out.
pub fn project_calendar(
    upcoming: &UpcomingPayload,
    events: Option<&EventsPayload>,
    tour: Option<TourType>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let duration = Duration::hours(DEFAULT_MATCH_DURATION_HOURS);

    let mut entries: Vec<CalendarEvent> = upcoming
        .matches
        .iter()
        .filter(|m| tour.is_none_or(|t| t == m.tour))
        .filter_map(|m| {
            let start = match parse_schedule_time(&m.scheduled_date) {
                Ok(start) => start,
                Err(e) => {
                    debug!(match_id = m.match_id, "Skipping calendar entry: {e}");
                    return None;
                }
            };
            if start < window_start || start >= window_end {
                return None;
            }
            let event = m
                .event_id
                .and_then(|id| events.and_then(|ev| ev.events_by_id.get(&id)));
            Some(CalendarEvent {
                start,
                end: start + duration,
                summary: format!("{} vs {}", m.player1_name, m.player2_name),
                description: describe_event(event),
                tour: m.tour,
                match_id: m.match_id,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.start.cmp(&b.start).then(a.match_id.cmp(&b.match_id)));
    entries
}
