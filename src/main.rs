// src/main.rs
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Args, is_config_command};
use commands::{
    handle_config_update_command, handle_list_config_command, handle_once_command, run_daemon,
};
use snooker_stats::config::Config;
use snooker_stats::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Logging needs the configured log path, but a broken config must still be reportable
    let config = Config::load_or_default(&Config::get_config_path()).await;
    let (log_file_path, _guard) = logging::setup_logging(&args, config.as_ref().ok()).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    if is_config_command(&args) {
        if args.new_requested_by.is_some()
            || args.new_tours.is_some()
            || args.enable_calendar
            || args.disable_calendar
        {
            handle_config_update_command(&args).await?;
        }
        if args.list_config {
            handle_list_config_command().await?;
        }
        return Ok(());
    }

    let config = config?;
    config.validate()?;

    if args.once {
        return handle_once_command(&config).await;
    }

    run_daemon(&config).await
}
