use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data from API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Rate limiting and credentials
    #[error("API rate limit still active after {attempts} attempts (URL: {url})")]
    RateLimited { url: String, attempts: u32 },

    #[error("API rejected the request credentials: {message} (URL: {url})")]
    Unauthorized { url: String, message: String },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    // Upstream status and payload errors
    #[error("API returned unexpected status {status} (URL: {url})")]
    UpstreamStatus { status: u16, url: String },

    #[error("API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Date/time parsing error: {0}")]
    DateTimeParse(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),

    #[error("Player cache error: {0}")]
    Cache(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a date/time parsing error with context
    pub fn datetime_parse_error(msg: impl Into<String>) -> Self {
        Self::DateTimeParse(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create a player cache persistence error
    pub fn cache_error(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a rate limit error once the retry budget is spent
    pub fn rate_limited(url: impl Into<String>, attempts: u32) -> Self {
        Self::RateLimited {
            url: url.into(),
            attempts,
        }
    }

    /// Create an authorization error (missing or rejected header value)
    pub fn unauthorized(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an error for a status code that is neither success nor a known retry case
    pub fn upstream_status(status: u16, url: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            url: url.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Transient failures that a later attempt may fix
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::RateLimited { .. }
                | AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
        )
    }

    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            AppError::NetworkTimeout { .. } | AppError::NetworkConnection { .. }
        )
    }

    /// Configuration problems that retrying cannot fix
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. })
    }

    /// Unexpected status or payload shape from the API
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamStatus { .. }
                | AppError::ApiMalformedJson { .. }
                | AppError::ApiUnexpectedStructure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_datetime_parse_error_helper() {
        let error = AppError::datetime_parse_error("Invalid date format");
        assert!(matches!(error, AppError::DateTimeParse(_)));
        assert_eq!(
            error.to_string(),
            "Date/time parsing error: Invalid date format"
        );
    }

    #[test]
    fn test_cache_error_helper() {
        let error = AppError::cache_error("rename failed");
        assert_eq!(error.to_string(), "Player cache error: rename failed");
    }

    #[test]
    fn test_rate_limited_helper() {
        let error = AppError::rate_limited("https://api.snooker.org/?t=20", 5);
        assert!(matches!(error, AppError::RateLimited { attempts: 5, .. }));
        assert_eq!(
            error.to_string(),
            "API rate limit still active after 5 attempts (URL: https://api.snooker.org/?t=20)"
        );
    }

    #[test]
    fn test_unauthorized_helper() {
        let error = AppError::unauthorized("https://api.snooker.org/?t=20", "missing header");
        assert!(error.is_unauthorized());
        assert_eq!(
            error.to_string(),
            "API rejected the request credentials: missing header (URL: https://api.snooker.org/?t=20)"
        );
    }

    #[test]
    fn test_network_timeout_helper() {
        let error = AppError::network_timeout("https://api.example.com");
        assert!(matches!(error, AppError::NetworkTimeout { .. }));
        assert_eq!(
            error.to_string(),
            "Network timeout while fetching data from: https://api.example.com"
        );
    }

    #[test]
    fn test_network_connection_helper() {
        let error = AppError::network_connection("https://api.example.com", "Connection refused");
        assert_eq!(
            error.to_string(),
            "Connection failed to: https://api.example.com - Connection refused"
        );
    }

    #[test]
    fn test_upstream_status_helper() {
        let error = AppError::upstream_status(500, "https://api.example.com");
        assert_eq!(
            error.to_string(),
            "API returned unexpected status 500 (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_api_unexpected_structure_helper() {
        let error = AppError::api_unexpected_structure("expected list", "https://api.example.com");
        assert_eq!(
            error.to_string(),
            "API returned unexpected data structure: expected list (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_error_classification() {
        let rate = AppError::rate_limited("u", 3);
        let timeout = AppError::network_timeout("u");
        let conn = AppError::network_connection("u", "refused");
        let auth = AppError::unauthorized("u", "bad header");
        let status = AppError::upstream_status(502, "u");
        let malformed = AppError::api_malformed_json("not json", "u");
        let config = AppError::config_error("x");

        assert!(rate.is_retryable());
        assert!(!rate.is_network_error());
        assert!(timeout.is_retryable() && timeout.is_network_error());
        assert!(conn.is_retryable() && conn.is_network_error());

        assert!(!auth.is_retryable());
        assert!(auth.is_unauthorized());

        assert!(status.is_upstream_error());
        assert!(malformed.is_upstream_error());
        assert!(!status.is_retryable());

        assert!(!config.is_retryable());
        assert!(!config.is_upstream_error());
        assert!(!config.is_unauthorized());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AppError = io.into();
        assert!(matches!(error, AppError::Io(_)));
        assert_eq!(error.to_string(), "I/O error: missing");
    }
}
