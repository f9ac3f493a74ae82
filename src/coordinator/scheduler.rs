//! Periodic scheduled refreshes, one timer per category.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::refresh_coordinator::{RefreshCoordinator, Trigger};
use crate::config::ScheduleSettings;
use crate::data_fetcher::models::CategoryKind;

/// Refresh interval of every category
pub fn category_intervals(settings: &ScheduleSettings) -> [(CategoryKind, Duration); 5] {
    [
        (CategoryKind::Season, Duration::from_secs(settings.season_seconds)),
        (CategoryKind::Rankings, Duration::from_secs(settings.rankings_seconds)),
        (CategoryKind::Upcoming, Duration::from_secs(settings.upcoming_seconds)),
        (CategoryKind::Events, Duration::from_secs(settings.events_seconds)),
        (CategoryKind::Scores, Duration::from_secs(settings.scores_seconds)),
    ]
}

/// Fires a scheduled trigger for `category` every `period` until cancelled.
///
/// The first tick fires immediately. Manual refreshes in between do not
/// move the schedule; a tick that lands on a running fetch is coalesced.
pub async fn run_category_schedule(
    coordinator: Arc<RefreshCoordinator>,
    category: CategoryKind,
    period: Duration,
    cancel: CancellationToken,
) {
    let period = period.max(Duration::from_secs(1));
    info!(%category, interval_secs = period.as_secs(), "Refresh schedule started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%category, "Refresh schedule stopping");
                break;
            }
            _ = interval.tick() => {
                let result = coordinator.trigger(category, Trigger::Scheduled).await;
                debug!(
                    %category,
                    succeeded = result.succeeded,
                    coalesced = result.coalesced,
                    "Scheduled refresh settled"
                );
            }
        }
    }
}
