use super::Config;
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API domain cannot be empty and must look like a URL or domain name
/// - The `X-Requested-By` value cannot be empty
/// - At least one tour must be selected
/// - Retry budgets are at least one attempt, the multiplier at least one
/// - HTTP timeout and all schedule intervals are positive
/// - If a log file path is provided, its parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_api_domain(&config.api_domain)?;

    if config.requested_by.trim().is_empty() {
        return Err(AppError::config_error(
            "requested_by (the X-Requested-By header value) cannot be empty",
        ));
    }

    if config.tours.is_empty() {
        return Err(AppError::config_error("At least one tour must be selected"));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be positive"));
    }

    let retry = &config.retry;
    if retry.rate_limit_max_attempts == 0 || retry.network_max_attempts == 0 {
        return Err(AppError::config_error(
            "Retry attempt budgets must be at least 1",
        ));
    }
    if retry.rate_limit_multiplier == 0 {
        return Err(AppError::config_error(
            "Rate limit multiplier must be at least 1",
        ));
    }

    for (name, seconds) in config.schedule.intervals() {
        if seconds == 0 {
            return Err(AppError::config_error(format!(
                "schedule.{name} must be positive"
            )));
        }
    }

    if config.bootstrap.refresh_after_days <= 0 {
        return Err(AppError::config_error(
            "bootstrap.refresh_after_days must be positive",
        ));
    }

    if let Some(log_path) = &config.log_file_path {
        validate_log_path(log_path)?;
    }

    Ok(())
}

fn validate_api_domain(api_domain: &str) -> Result<(), AppError> {
    if api_domain.is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }

    if !api_domain.starts_with("http://") && !api_domain.starts_with("https://") {
        // Without a scheme it should at least look like a domain
        if !api_domain.contains('.') && !api_domain.starts_with("localhost") {
            return Err(AppError::config_error(
                "API domain must be a valid URL or domain name",
            ));
        }
    }
    Ok(())
}

fn validate_log_path(log_path: &str) -> Result<(), AppError> {
    if log_path.is_empty() {
        return Err(AppError::config_error("Log file path cannot be empty"));
    }

    if let Some(parent) = Path::new(log_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::config_error(format!(
                "Cannot create log directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}
