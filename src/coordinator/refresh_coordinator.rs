//! Refresh orchestration
//!
//! Every category moves through `Idle -> Fetching -> Idle`. A trigger that
//! arrives while its category is fetching does not start a second fetch; it
//! waits for the running one and reports that result as coalesced. Jobs run
//! in their own task so the bookkeeping completes even when every caller
//! has gone away. Categories that read the season number wait on the
//! season refresh first when no season snapshot exists yet.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::calendar::{CalendarEvent, project_calendar};
use super::scheduler::{category_intervals, run_category_schedule};
use super::snapshot_store::{CategorySnapshot, SnapshotStore, SnapshotUpdate};
use crate::config::{BootstrapSettings, Config, ScheduleSettings};
use crate::constants::bootstrap::{RECHECK_SECONDS, RETRY_PAUSE_SECONDS};
use crate::constants::coordinator::FAILURE_ESCALATION_THRESHOLD;
use crate::data_fetcher::api::{Sleeper, SnookerApi, TokioSleeper};
use crate::data_fetcher::cache::PlayerNameCache;
use crate::data_fetcher::categories::{FetchContext, fetcher_for};
use crate::data_fetcher::models::{CategoryKind, CategoryPayload, TourType};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Scheduled,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Fetching,
}

/// The single live unit of work of a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchJob {
    pub category: CategoryKind,
    pub trigger: Trigger,
    pub requested_at: DateTime<Utc>,
}

/// How one refresh settled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshResult {
    pub category: CategoryKind,
    /// Trigger of the job that actually ran
    pub trigger: Trigger,
    pub succeeded: bool,
    /// True when this caller joined a fetch that was already running
    pub coalesced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub unauthorized: bool,
    pub finished_at: DateTime<Utc>,
}

/// Per-category results of [`RefreshCoordinator::refresh_all`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub results: Vec<RefreshResult>,
}

impl RefreshSummary {
    pub fn succeeded(&self) -> Vec<CategoryKind> {
        self.results
            .iter()
            .filter(|r| r.succeeded)
            .map(|r| r.category)
            .collect()
    }

    pub fn failed(&self) -> Vec<CategoryKind> {
        self.results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.category)
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn get(&self, category: CategoryKind) -> Option<&RefreshResult> {
        self.results.iter().find(|r| r.category == category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatus {
    pub category: CategoryKind,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_job: Option<FetchJob>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// `None` while the category has never settled
    pub snapshot_valid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapProgress {
    pub cursor: u32,
    pub total_target: u32,
    pub in_progress: bool,
    pub complete: bool,
    pub cached_players: usize,
    pub pending_lookups: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    pub categories: Vec<CategoryStatus>,
    pub bootstrap: BootstrapProgress,
    pub config_error: Option<String>,
}

struct InFlight {
    job: FetchJob,
    result: watch::Receiver<Option<RefreshResult>>,
}

#[derive(Default)]
struct CategoryState {
    in_flight: Option<InFlight>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
    consecutive_failures: u32,
}

pub struct RefreshCoordinator {
    ctx: FetchContext,
    bootstrap: BootstrapSettings,
    schedule: ScheduleSettings,
    enable_calendar: bool,
    sleeper: Arc<dyn Sleeper>,
    states: Mutex<HashMap<CategoryKind, CategoryState>>,
    config_error: watch::Sender<Option<String>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("tours", &self.ctx.tours)
            .field("enable_calendar", &self.enable_calendar)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Builds a coordinator around an existing API client and name cache.
    ///
    /// `sleeper` paces the bootstrap sweep and the on-demand name resolver.
    pub fn new(
        config: &Config,
        api: SnookerApi,
        names: Arc<PlayerNameCache>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Arc<Self> {
        let (config_error, _) = watch::channel(None);
        Arc::new(Self {
            ctx: FetchContext {
                api,
                names,
                tours: config.tours.clone(),
                snapshots: Arc::new(SnapshotStore::new()),
            },
            bootstrap: config.bootstrap.clone(),
            schedule: config.schedule.clone(),
            enable_calendar: config.enable_calendar,
            sleeper,
            states: Mutex::new(HashMap::new()),
            config_error,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Creates the API client and opens the persisted name cache from `config`.
    pub async fn open(config: &Config) -> Result<Arc<Self>, AppError> {
        let api = SnookerApi::from_config(config)?;
        let names = PlayerNameCache::open(
            &config.player_cache_file(),
            config.bootstrap.failed_lookup_cooldown(),
        )
        .await?;
        Ok(Self::new(config, api, names, Arc::new(TokioSleeper)))
    }

    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.ctx.snapshots
    }

    pub fn snapshot(&self, category: CategoryKind) -> Option<Arc<CategorySnapshot>> {
        self.ctx.snapshots.get(category)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotUpdate> {
        self.ctx.snapshots.subscribe()
    }

    pub fn names(&self) -> &Arc<PlayerNameCache> {
        &self.ctx.names
    }

    pub fn api(&self) -> &SnookerApi {
        &self.ctx.api
    }

    /// Configuration problems (currently `Unauthorized`) that retrying cannot fix
    pub fn config_errors(&self) -> watch::Receiver<Option<String>> {
        self.config_error.subscribe()
    }

    pub fn config_error(&self) -> Option<String> {
        self.config_error.borrow().clone()
    }

    fn lock_states(&self) -> std::sync::MutexGuard<'_, HashMap<CategoryKind, CategoryState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refreshes `category`, or joins its running fetch.
    pub async fn trigger(self: &Arc<Self>, category: CategoryKind, trigger: Trigger) -> RefreshResult {
        let (mut result_rx, coalesced) = {
            let mut states = self.lock_states();
            let state = states.entry(category).or_default();
            match &state.in_flight {
                Some(running) => {
                    debug!(
                        %category,
                        ?trigger,
                        running = ?running.job.trigger,
                        "Refresh already in flight, coalescing"
                    );
                    (running.result.clone(), true)
                }
                None => {
                    let job = FetchJob {
                        category,
                        trigger,
                        requested_at: Utc::now(),
                    };
                    let (done, result_rx) = watch::channel(None);
                    state.in_flight = Some(InFlight {
                        job: job.clone(),
                        result: result_rx.clone(),
                    });
                    tokio::spawn(Arc::clone(self).run_job(job, done));
                    (result_rx, false)
                }
            }
        };

        let settled = match result_rx.wait_for(Option::is_some).await {
            Ok(result) => (*result).clone(),
            Err(_) => None,
        };
        let mut result = settled.unwrap_or_else(|| RefreshResult {
            category,
            trigger,
            succeeded: false,
            coalesced,
            error: Some("refresh task ended without a result".to_string()),
            unauthorized: false,
            finished_at: Utc::now(),
        });
        result.coalesced = coalesced;
        result
    }

    async fn run_job(self: Arc<Self>, job: FetchJob, done: watch::Sender<Option<RefreshResult>>) {
        let category = job.category;
        info!(%category, trigger = ?job.trigger, "Refreshing category");
        let started = Instant::now();

        let fetcher = fetcher_for(category);
        if fetcher.needs_season() && self.ctx.snapshots.season_number().is_none() {
            debug!(%category, "No season snapshot yet, refreshing season first");
            let season = self.season_first(job.trigger).await;
            if !season.succeeded {
                debug!(%category, "Season refresh failed, the fetch asks the API itself");
            }
        }

        let ctx = self.ctx.clone();
        let fetch = tokio::spawn(async move { fetcher.fetch(&ctx).await });
        let outcome = match fetch.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AppError::cancelled(format!(
                "{category} refresh task ended abnormally: {e}"
            ))),
        };

        let result = self.settle(&job, outcome, started.elapsed());

        let mut states = self.lock_states();
        if let Some(state) = states.get_mut(&category) {
            state.in_flight = None;
        }
        done.send_replace(Some(result));
    }

    /// Season refresh that dependent categories wait on. It joins a running
    /// season fetch like any other trigger.
    fn season_first(self: &Arc<Self>, trigger: Trigger) -> BoxFuture<'_, RefreshResult> {
        Box::pin(self.trigger(CategoryKind::Season, trigger))
    }

    /// Applies a finished fetch to the snapshot store and the category state.
    fn settle(
        &self,
        job: &FetchJob,
        outcome: Result<CategoryPayload, AppError>,
        elapsed: Duration,
    ) -> RefreshResult {
        let category = job.category;
        let finished_at = Utc::now();

        match outcome {
            Ok(payload) => {
                self.ctx.snapshots.publish(payload, &self.ctx.tours);
                {
                    let mut states = self.lock_states();
                    let state = states.entry(category).or_default();
                    state.last_success = Some(finished_at);
                    state.last_error = None;
                    state.consecutive_failures = 0;
                }
                self.config_error.send_if_modified(|current| current.take().is_some());
                info!(
                    %category,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Category refreshed"
                );
                RefreshResult {
                    category,
                    trigger: job.trigger,
                    succeeded: true,
                    coalesced: false,
                    error: None,
                    unauthorized: false,
                    finished_at,
                }
            }
            Err(e) => {
                let message = e.to_string();
                let inserted_placeholder =
                    self.ctx.snapshots.record_failure(category, &self.ctx.tours);
                let failures = {
                    let mut states = self.lock_states();
                    let state = states.entry(category).or_default();
                    state.consecutive_failures += 1;
                    state.last_error = Some(message.clone());
                    state.consecutive_failures
                };

                if e.is_unauthorized() {
                    error!(
                        %category,
                        failures,
                        "Request rejected as unauthorized, check requested_by: {message}"
                    );
                    self.signal_config_error(message.clone());
                } else if failures >= FAILURE_ESCALATION_THRESHOLD {
                    error!(
                        %category,
                        failures,
                        "Category keeps failing, serving stale data: {message}"
                    );
                } else {
                    warn!(
                        %category,
                        failures,
                        no_previous_snapshot = inserted_placeholder,
                        "Refresh failed, keeping previous snapshot; will retry on next cycle: {message}"
                    );
                }

                RefreshResult {
                    category,
                    trigger: job.trigger,
                    succeeded: false,
                    coalesced: false,
                    error: Some(message),
                    unauthorized: e.is_unauthorized(),
                    finished_at,
                }
            }
        }
    }

    fn signal_config_error(&self, message: String) {
        self.config_error.send_replace(Some(message));
    }

    pub async fn refresh(self: &Arc<Self>, category: CategoryKind) -> RefreshResult {
        self.trigger(category, Trigger::Manual).await
    }

    pub async fn refresh_season(self: &Arc<Self>) -> RefreshResult {
        self.refresh(CategoryKind::Season).await
    }

    pub async fn refresh_rankings(self: &Arc<Self>) -> RefreshResult {
        self.refresh(CategoryKind::Rankings).await
    }

    pub async fn refresh_upcoming(self: &Arc<Self>) -> RefreshResult {
        self.refresh(CategoryKind::Upcoming).await
    }

    pub async fn refresh_events(self: &Arc<Self>) -> RefreshResult {
        self.refresh(CategoryKind::Events).await
    }

    pub async fn refresh_scores(self: &Arc<Self>) -> RefreshResult {
        self.refresh(CategoryKind::Scores).await
    }

    /// Refreshes every category concurrently and waits for all of them to settle.
    pub async fn refresh_all(self: &Arc<Self>) -> RefreshSummary {
        let results = join_all(CategoryKind::ALL.into_iter().map(|kind| self.refresh(kind))).await;
        let summary = RefreshSummary { results };
        info!(
            succeeded = summary.succeeded().len(),
            failed = summary.failed().len(),
            "Refresh of all categories settled"
        );
        summary
    }

    pub fn status(&self) -> CoordinatorStatus {
        let categories = {
            let states = self.lock_states();
            CategoryKind::ALL
                .into_iter()
                .map(|category| {
                    let state = states.get(&category);
                    let current_job = state
                        .and_then(|s| s.in_flight.as_ref())
                        .map(|running| running.job.clone());
                    CategoryStatus {
                        category,
                        phase: if current_job.is_some() {
                            Phase::Fetching
                        } else {
                            Phase::Idle
                        },
                        current_job,
                        last_success: state.and_then(|s| s.last_success),
                        last_error: state.and_then(|s| s.last_error.clone()),
                        consecutive_failures: state.map_or(0, |s| s.consecutive_failures),
                        snapshot_valid: self.ctx.snapshots.get(category).map(|snap| snap.valid),
                    }
                })
                .collect()
        };

        let bootstrap = self.ctx.names.bootstrap_state();
        CoordinatorStatus {
            categories,
            bootstrap: BootstrapProgress {
                cursor: bootstrap.cursor,
                total_target: bootstrap.total_target,
                in_progress: bootstrap.in_progress,
                complete: bootstrap.is_complete(),
                cached_players: self.ctx.names.len(),
                pending_lookups: self.ctx.names.pending_lookups(),
            },
            config_error: self.config_error(),
        }
    }

    /// Calendar entries of the upcoming matches snapshot, or `None` when the
    /// calendar is disabled.
    pub fn calendar_events(
        &self,
        tour: Option<TourType>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Option<Vec<CalendarEvent>> {
        if !self.enable_calendar {
            return None;
        }
        let upcoming = self.ctx.snapshots.get(CategoryKind::Upcoming);
        let events = self.ctx.snapshots.get(CategoryKind::Events);
        let Some(upcoming) = upcoming
            .as_ref()
            .and_then(|snap| snap.payload.as_ref()?.as_upcoming())
        else {
            return Some(Vec::new());
        };
        let events = events
            .as_ref()
            .and_then(|snap| snap.payload.as_ref()?.as_events());
        Some(project_calendar(
            upcoming,
            events,
            tour,
            window_start,
            window_end,
        ))
    }

    /// Spawns the name resolver, the bootstrap supervisor and the refresh schedule.
    pub fn start(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            warn!("Refresh coordinator already started");
            return;
        }

        tasks.push(tokio::spawn(Arc::clone(&self.ctx.names).run_resolver(
            self.ctx.api.clone(),
            self.bootstrap.lookup_pacing(),
            Arc::clone(&self.sleeper),
            self.cancel.child_token(),
        )));

        if self.bootstrap.enabled {
            tasks.push(tokio::spawn(Arc::clone(self).supervise_bootstrap()));
        } else {
            info!("Player name bootstrap disabled, relying on on-demand lookups");
        }
        let completion = self.ctx.names.subscribe_completion();
        if !*completion.borrow() {
            tasks.push(tokio::spawn(
                Arc::clone(self).refresh_after_bootstrap(completion),
            ));
        }

        if self.schedule.enabled {
            for (category, period) in category_intervals(&self.schedule) {
                tasks.push(tokio::spawn(run_category_schedule(
                    Arc::clone(self),
                    category,
                    period,
                    self.cancel.child_token(),
                )));
            }
        } else {
            info!("Scheduled refreshes disabled");
        }
        info!(tasks = tasks.len(), "Refresh coordinator started");
    }

    /// Runs the bootstrap until cancelled, resuming after failures and
    /// re-checking a completed sweep for the periodic name refresh.
    async fn supervise_bootstrap(self: Arc<Self>) {
        loop {
            let pause = match self
                .ctx
                .names
                .bootstrap(
                    &self.ctx.api,
                    &self.bootstrap,
                    self.ctx.snapshots.season_number(),
                    self.sleeper.as_ref(),
                    &self.cancel,
                )
                .await
            {
                Ok(outcome) if outcome.cancelled => break,
                Ok(outcome) => {
                    debug!(
                        fetched = outcome.fetched,
                        skipped = outcome.skipped,
                        missing = outcome.missing,
                        "Player name bootstrap idle"
                    );
                    Duration::from_secs(RECHECK_SECONDS)
                }
                Err(e) if e.is_unauthorized() => {
                    error!("Player name bootstrap rejected as unauthorized: {e}");
                    self.signal_config_error(e.to_string());
                    Duration::from_secs(RETRY_PAUSE_SECONDS)
                }
                Err(e) => {
                    warn!(
                        pause_secs = RETRY_PAUSE_SECONDS,
                        "Player name bootstrap interrupted, resuming later: {e}"
                    );
                    Duration::from_secs(RETRY_PAUSE_SECONDS)
                }
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
        debug!("Bootstrap supervisor stopped");
    }

    /// Refreshes the name-bearing categories once the bootstrap first completes.
    async fn refresh_after_bootstrap(self: Arc<Self>, mut completion: watch::Receiver<bool>) {
        let completed = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            completed = async { completion.wait_for(|done| *done).await.is_ok() } => completed,
        };
        if !completed {
            return;
        }

        info!("Player name bootstrap complete, refreshing name-bearing categories");
        let name_bearing = CategoryKind::ALL
            .into_iter()
            .filter(|kind| fetcher_for(*kind).needs_player_names());
        join_all(name_bearing.map(|kind| self.trigger(kind, Trigger::Scheduled))).await;
    }

    /// Cancels every background task and waits for them to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for joined in join_all(tasks).await {
            if let Err(e) = joined {
                warn!("Background task ended abnormally: {e}");
            }
        }
        info!("Refresh coordinator stopped");
    }
}
