//! URL building utilities for snooker.org endpoints
//!
//! snooker.org exposes every resource through query parameters on the root
//! path; `t` selects the request type.

/// Builds the current-season URL (`t=20`).
///
/// # Example
/// ```
/// use snooker_stats::data_fetcher::api::build_current_season_url;
///
/// let url = build_current_season_url("https://api.snooker.org");
/// assert_eq!(url, "https://api.snooker.org/?t=20");
/// ```
pub fn build_current_season_url(api_domain: &str) -> String {
    format!("{api_domain}/?t=20")
}

/// Builds a ranking list URL for a ranking type and season.
///
/// # Example
/// ```
/// use snooker_stats::data_fetcher::api::build_rankings_url;
///
/// let url = build_rankings_url("https://api.snooker.org", "MoneyRankings", 2024);
/// assert_eq!(url, "https://api.snooker.org/?rt=MoneyRankings&s=2024");
/// ```
pub fn build_rankings_url(api_domain: &str, ranking_type: &str, season: i64) -> String {
    format!("{api_domain}/?rt={ranking_type}&s={season}")
}

/// Builds the upcoming matches URL for one tour (`t=14`).
pub fn build_upcoming_matches_url(api_domain: &str, tour: &str) -> String {
    format!("{api_domain}/?t=14&tr={tour}")
}

/// Builds the season events URL (`t=5`). Without a tour every event of the season is listed.
///
/// # Example
/// ```
/// use snooker_stats::data_fetcher::api::build_season_events_url;
///
/// let url = build_season_events_url("https://api.snooker.org", 2024, Some("main"));
/// assert_eq!(url, "https://api.snooker.org/?t=5&s=2024&tr=main");
/// let url = build_season_events_url("https://api.snooker.org", 2024, None);
/// assert_eq!(url, "https://api.snooker.org/?t=5&s=2024");
/// ```
pub fn build_season_events_url(api_domain: &str, season: i64, tour: Option<&str>) -> String {
    match tour {
        Some(tour) => format!("{api_domain}/?t=5&s={season}&tr={tour}"),
        None => format!("{api_domain}/?t=5&s={season}"),
    }
}

/// Builds the currently running matches URL for one tour (`t=17`).
pub fn build_current_matches_url(api_domain: &str, tour: &str) -> String {
    format!("{api_domain}/?t=17&tr={tour}")
}

/// Builds the player URL (`p=<id>`).
pub fn build_player_url(api_domain: &str, player_id: i64) -> String {
    format!("{api_domain}/?p={player_id}")
}
