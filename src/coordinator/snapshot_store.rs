//! Latest published value per category.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use crate::data_fetcher::models::{CategoryKind, CategoryPayload, TourType};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySnapshot {
    pub category: CategoryKind,
    pub fetched_at: DateTime<Utc>,
    pub tour_filter: BTreeSet<TourType>,
    /// `None` only for the invalid placeholder of a category that never succeeded
    pub payload: Option<CategoryPayload>,
    pub valid: bool,
}

/// Broadcast whenever a snapshot is replaced
#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    pub category: CategoryKind,
    pub snapshot: Arc<CategorySnapshot>,
}

/// Holds one snapshot per category. Each category is replaced as a whole,
/// readers get an `Arc` and never observe a partial update.
#[derive(Debug)]
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<CategoryKind, Arc<CategorySnapshot>>>,
    updates: broadcast::Sender<SnapshotUpdate>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            snapshots: RwLock::new(HashMap::new()),
            updates,
        }
    }

    pub fn get(&self, category: CategoryKind) -> Option<Arc<CategorySnapshot>> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .cloned()
    }

    /// All present snapshots, in category order
    pub fn all(&self) -> Vec<Arc<CategorySnapshot>> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        CategoryKind::ALL
            .iter()
            .filter_map(|kind| snapshots.get(kind).cloned())
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotUpdate> {
        self.updates.subscribe()
    }

    /// Replaces the snapshot of the payload's category.
    pub fn publish(
        &self,
        payload: CategoryPayload,
        tour_filter: &BTreeSet<TourType>,
    ) -> Arc<CategorySnapshot> {
        let category = payload.kind();
        let snapshot = Arc::new(CategorySnapshot {
            category,
            fetched_at: Utc::now(),
            tour_filter: tour_filter.clone(),
            payload: Some(payload),
            valid: true,
        });
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category, snapshot.clone());
        debug!(%category, "Published snapshot");

        // No subscribers is fine
        let _ = self.updates.send(SnapshotUpdate {
            category,
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    /// Records a failed fetch. An existing snapshot is left untouched; a
    /// category that never succeeded gets an invalid, payload-less entry.
    ///
    /// Returns true when the placeholder was inserted.
    pub fn record_failure(
        &self,
        category: CategoryKind,
        tour_filter: &BTreeSet<TourType>,
    ) -> bool {
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        if snapshots.contains_key(&category) {
            return false;
        }
        snapshots.insert(
            category,
            Arc::new(CategorySnapshot {
                category,
                fetched_at: Utc::now(),
                tour_filter: tour_filter.clone(),
                payload: None,
                valid: false,
            }),
        );
        true
    }

    /// Season number of the latest season snapshot
    pub fn season_number(&self) -> Option<i64> {
        self.get(CategoryKind::Season)
            .and_then(|snap| snap.payload.as_ref()?.as_season().map(|s| s.season))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::{EventsPayload, SeasonInfo, SeasonPayload};

    fn season_payload(season: i64) -> CategoryPayload {
        CategoryPayload::Season(SeasonPayload {
            season,
            info: SeasonInfo {
                season: Some(season),
                ..Default::default()
            },
        })
    }

    fn events_payload() -> CategoryPayload {
        CategoryPayload::Events(EventsPayload {
            season: 2024,
            events: Vec::new(),
            events_by_id: Default::default(),
        })
    }

    #[test]
    fn test_failure_without_prior_snapshot_inserts_invalid() {
        let store = SnapshotStore::new();
        let tours = BTreeSet::from([TourType::MainTour]);

        assert!(store.record_failure(CategoryKind::Events, &tours));

        let snap = store.get(CategoryKind::Events).unwrap();
        assert!(!snap.valid);
        assert!(snap.payload.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        let tours = BTreeSet::from([TourType::MainTour]);
        let published = store.publish(events_payload(), &tours);

        assert!(!store.record_failure(CategoryKind::Events, &tours));

        let snap = store.get(CategoryKind::Events).unwrap();
        assert_eq!(snap, published);
        assert!(snap.valid);
    }

    #[test]
    fn test_publish_replaces_only_its_category() {
        let store = SnapshotStore::new();
        let tours = BTreeSet::from([TourType::MainTour]);
        let events = store.publish(events_payload(), &tours);
        store.publish(season_payload(2024), &tours);
        store.publish(season_payload(2025), &tours);

        assert_eq!(store.season_number(), Some(2025));
        assert_eq!(store.get(CategoryKind::Events).unwrap(), events);
        let kinds: Vec<_> = store.all().iter().map(|s| s.category).collect();
        assert_eq!(kinds, vec![CategoryKind::Season, CategoryKind::Events]);
    }

    #[tokio::test]
    async fn test_publish_broadcasts_update() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();
        store.publish(season_payload(2024), &BTreeSet::new());

        let update = rx.recv().await.unwrap();
        assert_eq!(update.category, CategoryKind::Season);
        assert!(update.snapshot.valid);
    }
}
