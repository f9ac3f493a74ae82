//! Persistent player name cache with non-blocking resolution
//!
//! Reads go through an `Arc` snapshot of the cache document, so category
//! fetchers never wait on the network or on a pending write. All mutations
//! are serialized through one async writer lock and become visible only
//! after they were persisted.

use chrono::Utc;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::store::{BootstrapState, CacheDocument, PlayerRecord, load_document, save_document};
use crate::constants::bootstrap::FAILED_LOOKUP_CAPACITY;
use crate::data_fetcher::api::{SnookerApi, Sleeper};
use crate::data_fetcher::player_names::{NameLookup, display_name_from_row, unknown_placeholder};
use crate::error::AppError;

pub struct PlayerNameCache {
    path: PathBuf,
    snapshot: RwLock<Arc<CacheDocument>>,
    writer: tokio::sync::Mutex<()>,
    lookup_tx: mpsc::UnboundedSender<i64>,
    lookup_rx: Mutex<Option<mpsc::UnboundedReceiver<i64>>>,
    queued: Mutex<HashSet<i64>>,
    failed: Mutex<LruCache<i64, Instant>>,
    failed_cooldown: Duration,
    completion: watch::Sender<bool>,
}

impl std::fmt::Debug for PlayerNameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerNameCache")
            .field("path", &self.path)
            .field("players", &self.len())
            .finish_non_exhaustive()
    }
}

impl PlayerNameCache {
    /// Opens the cache persisted at `path` (empty if the file does not exist yet).
    #[instrument]
    pub async fn open(path: &Path, failed_cooldown: Duration) -> Result<Arc<Self>, AppError> {
        let document = load_document(path).await?;
        info!(
            players = document.players.len(),
            cursor = document.bootstrap.cursor,
            complete = document.bootstrap.is_complete(),
            "Player name cache opened"
        );

        let (lookup_tx, lookup_rx) = mpsc::unbounded_channel();
        let capacity = NonZeroUsize::new(FAILED_LOOKUP_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        let (completion, _) = watch::channel(document.bootstrap.is_complete());

        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            snapshot: RwLock::new(Arc::new(document)),
            writer: tokio::sync::Mutex::new(()),
            lookup_tx,
            lookup_rx: Mutex::new(Some(lookup_rx)),
            queued: Mutex::new(HashSet::new()),
            failed: Mutex::new(LruCache::new(capacity)),
            failed_cooldown,
            completion,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current immutable view of the cache
    pub fn snapshot(&self) -> Arc<CacheDocument> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&self, player_id: i64) -> Option<PlayerRecord> {
        self.snapshot().players.get(&player_id).cloned()
    }

    /// Cached name without scheduling a lookup
    pub fn name(&self, player_id: i64) -> Option<String> {
        self.snapshot()
            .players
            .get(&player_id)
            .map(|record| record.name.clone())
    }

    /// Returns the cached name, or a placeholder while a background lookup is scheduled.
    ///
    /// Never waits on the network.
    pub fn resolve(&self, player_id: i64) -> String {
        match self.name(player_id) {
            Some(name) => name,
            None => {
                self.enqueue_lookup(player_id);
                unknown_placeholder(player_id)
            }
        }
    }

    /// Resolves an optional slot; absent or zero ids are unassigned.
    pub fn lookup(&self, player_id: Option<i64>) -> NameLookup {
        match player_id.filter(|id| *id > 0) {
            None => NameLookup::Unassigned,
            Some(id) => match self.name(id) {
                Some(name) => NameLookup::Known(name),
                None => {
                    self.enqueue_lookup(id);
                    NameLookup::Unknown(unknown_placeholder(id))
                }
            },
        }
    }

    pub fn bootstrap_state(&self) -> BootstrapState {
        self.snapshot().bootstrap.clone()
    }

    pub fn is_bootstrap_complete(&self) -> bool {
        self.snapshot().bootstrap.is_complete()
    }

    /// Receiver that flips to `true` once a bootstrap sweep completes
    pub fn subscribe_completion(&self) -> watch::Receiver<bool> {
        self.completion.subscribe()
    }

    /// Number of identifiers waiting for a background lookup
    pub fn pending_lookups(&self) -> usize {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Schedules a background lookup unless one is queued or the id recently failed.
    pub fn enqueue_lookup(&self, player_id: i64) -> bool {
        if player_id <= 0 || self.in_failed_cooldown(player_id) {
            return false;
        }

        let newly_queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player_id);
        if !newly_queued {
            return false;
        }

        if self.lookup_tx.send(player_id).is_err() {
            debug!(player_id, "Lookup queue closed, dropping request");
            self.clear_queued(player_id);
            return false;
        }
        debug!(player_id, "Queued player name lookup");
        true
    }

    fn clear_queued(&self, player_id: i64) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&player_id);
    }

    fn in_failed_cooldown(&self, player_id: i64) -> bool {
        let mut failed = self.failed.lock().unwrap_or_else(PoisonError::into_inner);
        match failed.peek(&player_id) {
            Some(at) if at.elapsed() < self.failed_cooldown => true,
            Some(_) => {
                failed.pop(&player_id);
                false
            }
            None => false,
        }
    }

    fn mark_failed(&self, player_id: i64) {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(player_id, Instant::now());
    }

    /// Applies one mutation under the writer lock, persists it, then publishes it.
    async fn apply<F>(&self, mutate: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut CacheDocument),
    {
        let _guard = self.writer.lock().await;
        let mut next = (*self.snapshot()).clone();
        mutate(&mut next);
        save_document(&self.path, &next).await?;

        let complete = next.bootstrap.is_complete();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        self.completion.send_if_modified(|current| {
            let changed = *current != complete;
            *current = complete;
            changed
        });
        Ok(())
    }

    /// Inserts or overwrites names.
    pub async fn insert_records(&self, records: Vec<PlayerRecord>) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }
        let count = records.len();
        self.apply(|doc| {
            for record in records {
                doc.players.insert(record.id, record);
            }
        })
        .await?;
        debug!(count, "Stored player names");
        Ok(())
    }

    /// Persists a bootstrap step: the optional new record and the advanced state together.
    pub async fn apply_bootstrap_step(
        &self,
        record: Option<PlayerRecord>,
        state: BootstrapState,
    ) -> Result<(), AppError> {
        self.apply(|doc| {
            if let Some(record) = record {
                doc.players.insert(record.id, record);
            }
            doc.bootstrap = state;
        })
        .await
    }

    /// Consumes the lookup queue until cancelled, one paced request at a time.
    ///
    /// Only one resolver may run per cache; a second call returns immediately.
    pub async fn run_resolver(
        self: Arc<Self>,
        api: SnookerApi,
        pacing: Duration,
        sleeper: Arc<dyn Sleeper>,
        cancel: CancellationToken,
    ) {
        let Some(mut rx) = self
            .lookup_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            warn!("Player name resolver already running");
            return;
        };
        info!("Player name resolver started");

        loop {
            let player_id = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = rx.recv() => match next {
                    Some(id) => id,
                    None => break,
                },
            };

            if self.name(player_id).is_some() {
                self.clear_queued(player_id);
                continue;
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.clear_queued(player_id);
                    break;
                }
                result = api.player(player_id) => result,
            };
            self.handle_lookup_result(player_id, result).await;
            self.clear_queued(player_id);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleeper.sleep(pacing) => {}
            }
        }

        // Return the receiver so a later resolver can resume the queue
        *self
            .lookup_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(rx);
        info!("Player name resolver stopped");
    }

    async fn handle_lookup_result(
        &self,
        player_id: i64,
        result: Result<Option<crate::data_fetcher::models::PlayerRow>, AppError>,
    ) {
        match result {
            Ok(Some(row)) => {
                let record = PlayerRecord {
                    id: player_id,
                    name: display_name_from_row(&row, player_id),
                    fetched_at: Utc::now(),
                };
                let name = record.name.clone();
                match self.insert_records(vec![record]).await {
                    Ok(()) => info!(player_id, %name, "Resolved player name"),
                    Err(e) => warn!(player_id, "Failed to persist resolved name: {e}"),
                }
            }
            Ok(None) => {
                warn!(player_id, "Player lookup returned no record");
                self.mark_failed(player_id);
            }
            Err(e) => {
                warn!(player_id, "Player lookup failed: {e}");
                self.mark_failed(player_id);
            }
        }
    }

    /// Runs the paced top-N sweep. See [`super::bootstrap::run_bootstrap`].
    pub async fn bootstrap(
        &self,
        api: &SnookerApi,
        settings: &crate::config::BootstrapSettings,
        season: Option<i64>,
        sleeper: &dyn Sleeper,
        cancel: &CancellationToken,
    ) -> Result<super::bootstrap::BootstrapOutcome, AppError> {
        super::bootstrap::run_bootstrap(self, api, settings, season, sleeper, cancel).await
    }
}
