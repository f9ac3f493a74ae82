use crate::constants::{DEFAULT_API_DOMAIN, DEFAULT_HTTP_TIMEOUT_SECONDS, env_vars};
use crate::data_fetcher::models::TourType;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod tuning;
pub mod validation;

use paths::{get_config_path, get_default_cache_path, get_log_dir_path};
pub use tuning::{BootstrapSettings, RetrySettings, ScheduleSettings};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// API domain for snooker.org. Defaults to https://api.snooker.org
    #[serde(default = "default_api_domain")]
    pub api_domain: String,
    /// Value sent in the `X-Requested-By` header. Issued by snooker.org on request.
    #[serde(default)]
    pub requested_by: String,
    /// Tours whose rankings, matches and scores are retained
    #[serde(default = "default_tours")]
    pub tours: BTreeSet<TourType>,
    /// Whether the calendar projection of upcoming matches is exposed
    #[serde(default)]
    pub enable_calendar: bool,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Location of the persisted player name cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_cache_path: Option<String>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

fn default_api_domain() -> String {
    DEFAULT_API_DOMAIN.to_string()
}

fn default_tours() -> BTreeSet<TourType> {
    BTreeSet::from([TourType::MainTour])
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: default_api_domain(),
            requested_by: String::new(),
            tours: default_tours(),
            enable_calendar: false,
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            player_cache_path: None,
            retry: RetrySettings::default(),
            bootstrap: BootstrapSettings::default(),
            schedule: ScheduleSettings::default(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from the default config file location.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `SNOOKER_API_DOMAIN` - Override API domain
    /// - `SNOOKER_REQUESTED_BY` - Override the `X-Requested-By` header value
    /// - `SNOOKER_LOG_FILE` - Override log file path
    /// - `SNOOKER_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `SNOOKER_CACHE_FILE` - Override player cache location
    ///
    /// # Notes
    /// - A missing config file is not an error; defaults are used
    /// - Fails validation when no header value is configured anywhere
    pub async fn load() -> Result<Self, AppError> {
        let config = Self::load_or_default(&get_config_path()).await?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file at `path` (or defaults when it does not exist) and
    /// applies environment overrides, without validating.
    pub async fn load_or_default(path: &str) -> Result<Self, AppError> {
        let mut config = if Path::new(path).exists() {
            Self::load_from_path(path).await?
        } else {
            tracing::debug!("No config file at {path}, using defaults");
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `SNOOKER_*` environment variable overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var(env_vars::API_DOMAIN) {
            self.api_domain = api_domain;
        }

        if let Ok(requested_by) = std::env::var(env_vars::REQUESTED_BY) {
            self.requested_by = requested_by;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }

        if let Ok(cache_path) = std::env::var(env_vars::CACHE_FILE) {
            self.player_cache_path = Some(cache_path);
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// API base URL with a scheme and without a trailing slash
    pub fn base_url(&self) -> String {
        let domain = self.api_domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Resolved player cache file location
    pub fn player_cache_file(&self) -> PathBuf {
        self.player_cache_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(get_default_cache_path)
    }

    /// Header value with everything but the first and last character hidden
    pub fn masked_requested_by(&self) -> String {
        let chars: Vec<char> = self.requested_by.chars().collect();
        match chars.len() {
            0 => "(not set)".to_string(),
            1..=3 => "*".repeat(chars.len()),
            n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
        }
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        self.save_to_path(&get_config_path()).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    ///
    /// # Notes
    /// - Shows config file location and effective settings, env overrides included
    /// - The header value is masked
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        if !Path::new(&config_path).exists() {
            println!("\nNo configuration file found at:");
            println!("{config_path}");
            println!("(Defaults and environment overrides are shown below)");
        }

        let config = Self::load_or_default(&config_path).await?;
        let tours: Vec<&str> = config.tours.iter().map(|t| t.code()).collect();

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        println!("{config_path}");
        println!("────────────────────────────────────");
        println!("API Domain:");
        println!("{}", config.api_domain);
        println!("────────────────────────────────────");
        println!("X-Requested-By:");
        println!("{}", config.masked_requested_by());
        println!("────────────────────────────────────");
        println!("Tours:");
        println!("{}", tours.join(", "));
        println!("────────────────────────────────────");
        println!("Calendar:");
        println!(
            "{}",
            if config.enable_calendar {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Player Cache:");
        println!("{}", config.player_cache_file().display());
        println!("────────────────────────────────────");
        println!("Bootstrap:");
        println!(
            "top {} players, {} s pacing, refresh after {} days",
            config.bootstrap.target_count,
            config.bootstrap.pacing_seconds,
            config.bootstrap.refresh_after_days
        );
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{}/snooker_stats.log", get_log_dir_path());
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist and adds an
    /// `https://` prefix to a bare domain.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }

        let content = toml::to_string_pretty(&Config {
            api_domain: self.base_url(),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path, without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
