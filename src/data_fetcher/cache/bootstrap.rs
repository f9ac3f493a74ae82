//! Paced, resumable sweep of the top money-ranked players into the name cache.

use chrono::Utc;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::player_cache::PlayerNameCache;
use super::store::{BootstrapState, PlayerRecord};
use crate::config::BootstrapSettings;
use crate::constants::ranking_types;
use crate::data_fetcher::api::{Sleeper, SnookerApi};
use crate::data_fetcher::player_names::display_name_from_row;
use crate::error::AppError;

/// Counters for one bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapOutcome {
    pub fetched: u32,
    /// Cached and still fresh, no request made
    pub skipped: u32,
    /// The API had no usable record for the id
    pub missing: u32,
    pub completed: bool,
    pub cancelled: bool,
}

/// Player ids of the money rankings, best first, without duplicates.
///
/// `season` skips the season request when the caller already knows it.
pub async fn ranked_player_ids(
    api: &SnookerApi,
    season: Option<i64>,
    limit: usize,
) -> Result<Vec<i64>, AppError> {
    let season = match season {
        Some(season) => season,
        None => api.current_season_number().await?,
    };
    let mut rows = api.rankings(season, ranking_types::MONEY).await?;
    // Unranked rows (position 0) go last; the sort is stable so upstream order breaks ties
    rows.sort_by_key(|row| (row.position <= 0, row.position));

    let mut seen = HashSet::new();
    let ids: Vec<i64> = rows
        .iter()
        .filter_map(|row| row.player())
        .filter(|id| seen.insert(*id))
        .take(limit)
        .collect();
    debug!(season, count = ids.len(), "Ranked player ids for bootstrap");
    Ok(ids)
}

/// Runs (or resumes) one bootstrap sweep.
///
/// A new sweep fixes its ranked id list and persists it with the cursor, so
/// an interrupted sweep resumes on the same list even if the rankings moved
/// in between, and never re-requests a name it already stored. Ids cached
/// more recently than `refresh_after_days` are skipped without a request. A
/// completed sweep older than `refresh_after_days` starts over at cursor 0.
///
/// `season` is the current season when the caller already has it.
///
/// Transient failures (rate limit or network budget exhausted) and
/// `Unauthorized` stop the sweep with the cursor left on the failed id.
#[instrument(skip_all, fields(target = settings.target_count))]
pub async fn run_bootstrap(
    cache: &PlayerNameCache,
    api: &SnookerApi,
    settings: &BootstrapSettings,
    season: Option<i64>,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
) -> Result<BootstrapOutcome, AppError> {
    let started = Utc::now();
    let refresh_after = settings.refresh_after();
    let target = settings.target_count as usize;
    let mut outcome = BootstrapOutcome::default();
    let mut state = cache.bootstrap_state();

    if state.in_progress {
        info!(cursor = state.cursor, "Resuming player name bootstrap");
        state.total_target = settings.target_count;
        if state.ranked_ids.is_empty() {
            debug!("No ranked ids stored with the cursor, fetching rankings");
            state.ranked_ids = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    return Ok(outcome);
                }
                ids = ranked_player_ids(api, season, target) => ids?,
            };
            cache.apply_bootstrap_step(None, state.clone()).await?;
        }
    } else {
        if state.is_complete() {
            if !state.needs_refresh(started, refresh_after) {
                debug!("Player name bootstrap already complete");
                outcome.completed = true;
                return Ok(outcome);
            }
            info!(
                days = settings.refresh_after_days,
                "Cached player names are due for refresh, starting new sweep"
            );
        } else {
            info!("Starting player name bootstrap");
        }

        let ranked = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                outcome.cancelled = true;
                return Ok(outcome);
            }
            ids = ranked_player_ids(api, season, target) => ids?,
        };
        if ranked.len() < target {
            warn!(
                available = ranked.len(),
                "Money rankings list fewer players than the bootstrap target"
            );
        }
        state = BootstrapState {
            cursor: 0,
            total_target: settings.target_count,
            in_progress: true,
            ranked_ids: ranked,
            started_at: Some(started),
            completed_at: state.completed_at,
        };
        cache.apply_bootstrap_step(None, state.clone()).await?;
    }

    let end = state.ranked_ids.len().min(target) as u32;
    while state.cursor < end {
        if cancel.is_cancelled() {
            info!(cursor = state.cursor, "Bootstrap cancelled");
            outcome.cancelled = true;
            return Ok(outcome);
        }

        let player_id = state.ranked_ids[state.cursor as usize];
        let fresh = cache
            .record(player_id)
            .is_some_and(|record| started - record.fetched_at < refresh_after);
        if fresh {
            state.cursor += 1;
            outcome.skipped += 1;
            cache.apply_bootstrap_step(None, state.clone()).await?;
            continue;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(cursor = state.cursor, "Bootstrap cancelled during request");
                outcome.cancelled = true;
                return Ok(outcome);
            }
            result = api.player(player_id) => result,
        };

        let record = match result {
            Ok(Some(row)) => {
                outcome.fetched += 1;
                Some(PlayerRecord {
                    id: player_id,
                    name: display_name_from_row(&row, player_id),
                    fetched_at: Utc::now(),
                })
            }
            Ok(None) => {
                warn!(player_id, "No player record, skipping");
                outcome.missing += 1;
                None
            }
            Err(e) if e.is_upstream_error() => {
                warn!(player_id, "Unusable player record ({e}), skipping");
                outcome.missing += 1;
                None
            }
            Err(e) => {
                warn!(
                    player_id,
                    cursor = state.cursor,
                    "Bootstrap interrupted: {e}"
                );
                return Err(e);
            }
        };

        state.cursor += 1;
        cache.apply_bootstrap_step(record, state.clone()).await?;
        info!(
            cursor = state.cursor,
            target = end,
            player_id,
            "Bootstrap progress"
        );

        if state.cursor < end {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    return Ok(outcome);
                }
                _ = sleeper.sleep(settings.pacing()) => {}
            }
        }
    }

    state.in_progress = false;
    state.ranked_ids.clear();
    state.completed_at = Some(Utc::now());
    cache.apply_bootstrap_step(None, state).await?;
    outcome.completed = true;
    info!(
        fetched = outcome.fetched,
        skipped = outcome.skipped,
        missing = outcome.missing,
        cached = cache.len(),
        "Player name bootstrap complete"
    );
    Ok(outcome)
}
