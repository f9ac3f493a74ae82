use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Whether the invocation only edits or prints configuration
pub fn is_config_command(args: &Args) -> bool {
    args.list_config
        || args.new_requested_by.is_some()
        || args.new_tours.is_some()
        || args.enable_calendar
        || args.disable_calendar
}

/// Snooker statistics service for snooker.org
///
/// Keeps seasons, rankings, upcoming matches, events and live scores fresh
/// while respecting the upstream rate limit, and resolves player ids to
/// names through a persistent cache.
///
/// By default runs as a daemon that refreshes every category on its schedule
/// and reads service commands from stdin, one per line:
/// refresh_season, refresh_rankings, refresh_upcoming, refresh_events,
/// refresh_scores, refresh_all, status, calendar [tour].
#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
#[command(styles = get_styles())]
pub struct Args {
    /// Refresh every category once, print the snapshots as JSON and exit.
    #[arg(short, long)]
    pub once: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Store the X-Requested-By header value issued by snooker.org
    #[arg(
        long = "set-requested-by",
        help_heading = "Configuration",
        value_name = "VALUE"
    )]
    pub new_requested_by: Option<String>,

    /// Store the tours to follow, comma separated (main, q, seniors, women)
    #[arg(
        long = "set-tours",
        help_heading = "Configuration",
        value_name = "TOURS",
        value_delimiter = ','
    )]
    pub new_tours: Option<Vec<String>>,

    /// Expose upcoming matches as calendar entries
    #[arg(
        long = "enable-calendar",
        help_heading = "Configuration",
        conflicts_with = "disable_calendar"
    )]
    pub enable_calendar: bool,

    /// Stop exposing calendar entries
    #[arg(long = "disable-calendar", help_heading = "Configuration")]
    pub disable_calendar: bool,

    /// Log to stdout as well in --once mode and lower the default level to debug.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}
