use crate::cli::Args;
use chrono::{Duration, Utc};
use serde_json::json;
use snooker_stats::config::Config;
use snooker_stats::constants::calendar::DEFAULT_WINDOW_DAYS;
use snooker_stats::coordinator::RefreshCoordinator;
use snooker_stats::data_fetcher::models::{CategoryKind, TourType};
use snooker_stats::error::AppError;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

/// One line of the daemon's stdin protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    Refresh(CategoryKind),
    RefreshAll,
    Status,
    Calendar(Option<TourType>),
}

impl FromStr for ServiceCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let argument = parts.next();

        let parsed = match command {
            "refresh_all" => ServiceCommand::RefreshAll,
            "status" => ServiceCommand::Status,
            "calendar" => ServiceCommand::Calendar(argument.map(str::parse).transpose()?),
            other => match other.strip_prefix("refresh_") {
                Some(category) => ServiceCommand::Refresh(category.parse()?),
                None => {
                    return Err(AppError::config_error(format!(
                        "Unknown command '{other}'"
                    )));
                }
            },
        };
        Ok(parsed)
    }
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles configuration update commands (--set-requested-by, --set-tours,
/// --enable-calendar, --disable-calendar).
///
/// Only the config file is read and written; environment overrides are not persisted.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let config_path = Config::get_config_path();
    let mut config = if Path::new(&config_path).exists() {
        Config::load_from_path(&config_path).await?
    } else {
        Config::default()
    };

    if let Some(requested_by) = &args.new_requested_by {
        config.requested_by = requested_by.trim().to_string();
    }

    if let Some(tours) = &args.new_tours {
        config.tours = tours
            .iter()
            .map(|code| code.trim().parse())
            .collect::<Result<BTreeSet<TourType>, _>>()?;
    }

    if args.enable_calendar {
        config.enable_calendar = true;
    } else if args.disable_calendar {
        config.enable_calendar = false;
    }

    config.save_to_path(&config_path).await?;
    println!("Config updated successfully!");
    Ok(())
}

/// Handles the --once command.
///
/// Refreshes every category once and prints the summary and the snapshots
/// as JSON. Exits with an error only when every category failed.
pub async fn handle_once_command(config: &Config) -> Result<(), AppError> {
    let coordinator = RefreshCoordinator::open(config).await?;
    let summary = coordinator.refresh_all().await;

    let output = json!({
        "summary": summary,
        "snapshots": coordinator.snapshots().all(),
        "bootstrap": coordinator.status().bootstrap,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if summary.succeeded().is_empty() {
        let reason = summary
            .results
            .iter()
            .find_map(|r| r.error.clone())
            .unwrap_or_default();
        return Err(AppError::config_error(format!(
            "Every category failed to refresh: {reason}"
        )));
    }
    Ok(())
}

/// Executes one service command and returns its JSON response.
pub async fn execute_service_command(
    coordinator: &Arc<RefreshCoordinator>,
    command: ServiceCommand,
) -> Result<serde_json::Value, AppError> {
    let value = match command {
        ServiceCommand::Refresh(category) => {
            let result = coordinator.refresh(category).await;
            json!({
                "result": result,
                "snapshot": coordinator.snapshot(category),
            })
        }
        ServiceCommand::RefreshAll => serde_json::to_value(coordinator.refresh_all().await)?,
        ServiceCommand::Status => serde_json::to_value(coordinator.status())?,
        ServiceCommand::Calendar(tour) => {
            let now = Utc::now();
            match coordinator.calendar_events(tour, now, now + Duration::days(DEFAULT_WINDOW_DAYS)) {
                Some(events) => serde_json::to_value(events)?,
                None => json!({ "error": "calendar is disabled (enable_calendar = false)" }),
            }
        }
    };
    Ok(value)
}

/// Runs the coordinator and serves stdin commands until EOF or Ctrl-C.
pub async fn run_daemon(config: &Config) -> Result<(), AppError> {
    let coordinator = RefreshCoordinator::open(config).await?;
    coordinator.start();

    let mut config_errors = coordinator.config_errors();
    let config_error_watch = tokio::spawn(async move {
        while config_errors.changed().await.is_ok() {
            let current = config_errors.borrow_and_update().clone();
            if let Some(message) = current {
                eprintln!("Configuration error: {message}");
                eprintln!("Set a valid header value with --set-requested-by and restart.");
            }
        }
    });

    info!("Waiting for commands on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match line.parse::<ServiceCommand>() {
            Ok(command) => execute_service_command(&coordinator, command).await,
            Err(e) => Err(e),
        };
        match response {
            Ok(value) => println!("{}", serde_json::to_string(&value)?),
            Err(e) => {
                warn!("Command '{line}' failed: {e}");
                println!("{}", json!({ "error": e.to_string() }));
            }
        }
    }

    coordinator.shutdown().await;
    config_error_watch.abort();
    if let Some(message) = coordinator.config_error() {
        error!("Stopped with unresolved configuration error: {message}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_commands() {
        assert_eq!(
            "refresh_scores".parse::<ServiceCommand>().unwrap(),
            ServiceCommand::Refresh(CategoryKind::Scores)
        );
        assert_eq!(
            " refresh_all ".parse::<ServiceCommand>().unwrap(),
            ServiceCommand::RefreshAll
        );
        assert_eq!(
            "calendar women".parse::<ServiceCommand>().unwrap(),
            ServiceCommand::Calendar(Some(TourType::Women))
        );
        assert_eq!(
            "calendar".parse::<ServiceCommand>().unwrap(),
            ServiceCommand::Calendar(None)
        );
        assert_eq!(
            "status".parse::<ServiceCommand>().unwrap(),
            ServiceCommand::Status
        );
    }

    #[test]
    fn test_unknown_commands_rejected() {
        assert!("refresh_teams".parse::<ServiceCommand>().is_err());
        assert!("reboot".parse::<ServiceCommand>().is_err());
        assert!("calendar juniors".parse::<ServiceCommand>().is_err());
    }
}
