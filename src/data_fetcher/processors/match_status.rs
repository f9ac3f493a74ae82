use crate::data_fetcher::models::MatchRow;
use serde::{Deserialize, Serialize};

/// Live-score state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Finished,
    InPlay,
    StartingSoon,
}

/// Classifies a match from its `Unfinished` flag and `EndDate`.
///
/// A non-blank end date always wins, so a match that carries both an end
/// date and a stale `Unfinished=true` is reported as finished. Every
/// combination of inputs lands in exactly one class.
///
/// # Examples
///
/// ```rust
/// use snooker_stats::data_fetcher::processors::{classify_match, MatchStatus};
///
/// assert_eq!(classify_match(true, ""), MatchStatus::InPlay);
/// assert_eq!(classify_match(false, ""), MatchStatus::StartingSoon);
/// assert_eq!(classify_match(false, "2024-05-01"), MatchStatus::Finished);
/// ```
pub fn classify_match(unfinished: bool, end_date: &str) -> MatchStatus {
    if !end_date.trim().is_empty() {
        MatchStatus::Finished
    } else if unfinished {
        MatchStatus::InPlay
    } else {
        MatchStatus::StartingSoon
    }
}

/// Determines the status of an upstream match row.
pub fn determine_match_status(row: &MatchRow) -> MatchStatus {
    let status = classify_match(row.unfinished, &row.end_date);
    tracing::trace!(
        match_id = row.id,
        unfinished = row.unfinished,
        end_date = %row.end_date,
        ?status,
        "Classified match"
    );
    status
}
