//! Operational tuning tables (`[retry]`, `[bootstrap]`, `[schedule]`).

use crate::constants::{bootstrap, retry, schedule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub rate_limit_initial_delay_seconds: u64,
    pub rate_limit_multiplier: u32,
    pub rate_limit_max_delay_seconds: u64,
    pub rate_limit_max_attempts: u32,
    pub network_initial_delay_ms: u64,
    pub network_max_delay_ms: u64,
    pub network_max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            rate_limit_initial_delay_seconds: retry::RATE_LIMIT_INITIAL_DELAY_SECONDS,
            rate_limit_multiplier: retry::RATE_LIMIT_MULTIPLIER,
            rate_limit_max_delay_seconds: retry::RATE_LIMIT_MAX_DELAY_SECONDS,
            rate_limit_max_attempts: retry::RATE_LIMIT_MAX_ATTEMPTS,
            network_initial_delay_ms: retry::NETWORK_INITIAL_DELAY_MS,
            network_max_delay_ms: retry::NETWORK_MAX_DELAY_MS,
            network_max_attempts: retry::NETWORK_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    /// Number of top money-ranked players to sweep
    pub target_count: u32,
    pub pacing_seconds: u64,
    pub lookup_pacing_ms: u64,
    pub refresh_after_days: i64,
    pub failed_lookup_cooldown_seconds: u64,
    /// Set to false to rely on on-demand lookups only
    pub enabled: bool,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            target_count: bootstrap::TARGET_COUNT,
            pacing_seconds: bootstrap::PACING_SECONDS,
            lookup_pacing_ms: bootstrap::LOOKUP_PACING_MS,
            refresh_after_days: bootstrap::REFRESH_AFTER_DAYS,
            failed_lookup_cooldown_seconds: bootstrap::FAILED_LOOKUP_COOLDOWN_SECONDS,
            enabled: true,
        }
    }
}

impl BootstrapSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_seconds)
    }

    pub fn lookup_pacing(&self) -> Duration {
        Duration::from_millis(self.lookup_pacing_ms)
    }

    pub fn failed_lookup_cooldown(&self) -> Duration {
        Duration::from_secs(self.failed_lookup_cooldown_seconds)
    }

    pub fn refresh_after(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_after_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub enabled: bool,
    pub season_seconds: u64,
    pub rankings_seconds: u64,
    pub upcoming_seconds: u64,
    pub events_seconds: u64,
    pub scores_seconds: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            season_seconds: schedule::SEASON_SECONDS,
            rankings_seconds: schedule::RANKINGS_SECONDS,
            upcoming_seconds: schedule::UPCOMING_SECONDS,
            events_seconds: schedule::EVENTS_SECONDS,
            scores_seconds: schedule::SCORES_SECONDS,
        }
    }
}

impl ScheduleSettings {
    /// All intervals paired with their table key, for validation and display
    pub fn intervals(&self) -> [(&'static str, u64); 5] {
        [
            ("season_seconds", self.season_seconds),
            ("rankings_seconds", self.rankings_seconds),
            ("upcoming_seconds", self.upcoming_seconds),
            ("events_seconds", self.events_seconds),
            ("scores_seconds", self.scores_seconds),
        ]
    }
}
