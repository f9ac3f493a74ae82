//! Application-wide constants and configuration defaults
//!
//! Every operational tuning value lives here so that the config layer can
//! fall back to a single, conservative set of defaults.

/// Default API domain for snooker.org
pub const DEFAULT_API_DOMAIN: &str = "https://api.snooker.org";

/// Header required by snooker.org on every request
pub const REQUESTED_BY_HEADER: &str = "X-Requested-By";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// Number of ranking rows published per ranking list
pub const RANKINGS_TOP_N: usize = 10;

/// Ranking type identifiers understood by the `rt` query parameter
pub mod ranking_types {
    pub const MONEY: &str = "MoneyRankings";
    pub const ONE_YEAR_MONEY: &str = "OneYearMoneyRankings";
}

/// Placeholder texts used when a player name is not (yet) known
pub mod placeholders {
    /// Shown when a match slot has no player assigned yet
    pub const TO_BE_DECIDED: &str = "TBD";

    /// Used by calendar descriptions when event metadata is missing
    pub const UNKNOWN: &str = "Unknown";
}

/// Retry configuration defaults for the rate-aware fetcher
pub mod retry {
    /// First delay after a 403 rate-limit response (seconds)
    pub const RATE_LIMIT_INITIAL_DELAY_SECONDS: u64 = 15;

    /// Multiplicative growth applied to the rate-limit delay
    pub const RATE_LIMIT_MULTIPLIER: u32 = 2;

    /// Upper bound for a single rate-limit delay (seconds)
    pub const RATE_LIMIT_MAX_DELAY_SECONDS: u64 = 120;

    /// Total number of requests made while rate limited before giving up
    pub const RATE_LIMIT_MAX_ATTEMPTS: u32 = 5;

    /// First delay after a connection failure or timeout (milliseconds)
    pub const NETWORK_INITIAL_DELAY_MS: u64 = 1000;

    /// Upper bound for a single network retry delay (milliseconds)
    pub const NETWORK_MAX_DELAY_MS: u64 = 8000;

    /// Total number of requests made on network failures before giving up
    pub const NETWORK_MAX_ATTEMPTS: u32 = 3;
}

/// Player name cache bootstrap defaults
pub mod bootstrap {
    /// Number of top-ranked players swept into the cache
    pub const TARGET_COUNT: u32 = 100;

    /// Delay between two bootstrap player requests (seconds).
    /// Larger than any retry backoff so the sweep stays below the request ceiling.
    pub const PACING_SECONDS: u64 = 5;

    /// Delay between two on-demand player lookups (milliseconds)
    pub const LOOKUP_PACING_MS: u64 = 1000;

    /// Age after which cached names are considered stale and a new sweep starts
    pub const REFRESH_AFTER_DAYS: i64 = 30;

    /// Cooldown before a failed on-demand lookup is attempted again (seconds)
    pub const FAILED_LOOKUP_COOLDOWN_SECONDS: u64 = 3600;

    /// Number of failed identifiers remembered for the cooldown
    pub const FAILED_LOOKUP_CAPACITY: usize = 512;

    /// File name of the persisted player cache
    pub const CACHE_FILE_NAME: &str = "player_cache.json";

    /// Format version of the persisted player cache
    pub const CACHE_FORMAT_VERSION: u32 = 1;

    /// Pause before a sweep stopped by an upstream failure is resumed (seconds)
    pub const RETRY_PAUSE_SECONDS: u64 = 60;

    /// How often a completed sweep is checked for the monthly refresh (seconds)
    pub const RECHECK_SECONDS: u64 = 6 * 3600;
}

/// Refresh coordinator defaults
pub mod coordinator {
    /// Consecutive failures of one category after which failures are logged as errors
    pub const FAILURE_ESCALATION_THRESHOLD: u32 = 3;
}

/// Scheduled refresh intervals in seconds
pub mod schedule {
    pub const SEASON_SECONDS: u64 = 86_400;
    pub const RANKINGS_SECONDS: u64 = 7 * 86_400;
    pub const UPCOMING_SECONDS: u64 = 86_400;
    pub const EVENTS_SECONDS: u64 = 86_400;
    pub const SCORES_SECONDS: u64 = 300;
}

/// Calendar projection defaults
pub mod calendar {
    /// Assumed match duration when the upstream gives no end time (hours)
    pub const DEFAULT_MATCH_DURATION_HOURS: i64 = 2;

    /// Default look-ahead window for calendar listings (days)
    pub const DEFAULT_WINDOW_DAYS: i64 = 365;
}

/// Environment variable names
pub mod env_vars {
    /// Environment variable for API domain override
    pub const API_DOMAIN: &str = "SNOOKER_API_DOMAIN";

    /// Environment variable for the `X-Requested-By` header value
    pub const REQUESTED_BY: &str = "SNOOKER_REQUESTED_BY";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "SNOOKER_LOG_FILE";

    /// Environment variable for HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "SNOOKER_HTTP_TIMEOUT";

    /// Environment variable for the player cache file location
    pub const CACHE_FILE: &str = "SNOOKER_CACHE_FILE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_constants_are_reasonable() {
        assert!(retry::RATE_LIMIT_MAX_ATTEMPTS > 0);
        assert!(retry::NETWORK_MAX_ATTEMPTS > 0);
        assert!(retry::RATE_LIMIT_MULTIPLIER >= 1);
        assert!(retry::RATE_LIMIT_INITIAL_DELAY_SECONDS <= retry::RATE_LIMIT_MAX_DELAY_SECONDS);
        assert!(retry::NETWORK_INITIAL_DELAY_MS <= retry::NETWORK_MAX_DELAY_MS);

        // Network retries use the shorter budget
        assert!(retry::NETWORK_MAX_DELAY_MS / 1000 < retry::RATE_LIMIT_INITIAL_DELAY_SECONDS);
    }

    #[test]
    fn test_bootstrap_pacing_exceeds_network_backoff() {
        assert!(bootstrap::PACING_SECONDS * 1000 > retry::NETWORK_INITIAL_DELAY_MS);
        assert!(bootstrap::LOOKUP_PACING_MS > 0);
        assert!(bootstrap::TARGET_COUNT > 0);
    }

    #[test]
    fn test_scores_refresh_most_often() {
        let intervals = [
            schedule::SEASON_SECONDS,
            schedule::RANKINGS_SECONDS,
            schedule::UPCOMING_SECONDS,
            schedule::EVENTS_SECONDS,
        ];
        assert!(intervals.iter().all(|i| *i > schedule::SCORES_SECONDS));
    }

    #[test]
    fn test_env_var_names_are_not_empty() {
        for name in [
            env_vars::API_DOMAIN,
            env_vars::REQUESTED_BY,
            env_vars::LOG_FILE,
            env_vars::HTTP_TIMEOUT,
            env_vars::CACHE_FILE,
        ] {
            assert!(name.starts_with("SNOOKER_"));
        }
    }
}
