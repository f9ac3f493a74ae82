//! Category fetchers.
//!
//! Every category follows the same fetch, filter, normalize shape behind
//! [`CategoryFetcher`]. Each one fails independently; the coordinator
//! decides what a failure means for the published snapshot.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::coordinator::SnapshotStore;
use crate::data_fetcher::api::SnookerApi;
use crate::data_fetcher::cache::PlayerNameCache;
use crate::data_fetcher::models::{CategoryKind, CategoryPayload, TourType};
use crate::data_fetcher::player_names::NameLookup;
use crate::error::AppError;

pub mod events;
pub mod rankings;
pub mod scores;
pub mod season;
pub mod upcoming;

pub use events::EventsFetcher;
pub use rankings::RankingsFetcher;
pub use scores::ScoresFetcher;
pub use season::SeasonFetcher;
pub use upcoming::UpcomingFetcher;

/// Everything a category fetch may read
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub api: SnookerApi,
    pub names: Arc<PlayerNameCache>,
    pub tours: BTreeSet<TourType>,
    /// Previously published snapshots (season number, event metadata)
    pub snapshots: Arc<SnapshotStore>,
}

impl FetchContext {
    /// Season from the season snapshot, falling back to the API
    pub async fn current_season(&self) -> Result<i64, AppError> {
        match self.snapshots.season_number() {
            Some(season) => Ok(season),
            None => {
                debug!("No season snapshot yet, asking the API");
                self.api.current_season_number().await
            }
        }
    }

    /// Non-blocking name lookup that schedules misses for background resolution
    pub fn lookup_name(&self, player_id: Option<i64>) -> NameLookup {
        self.names.lookup(player_id)
    }
}

#[async_trait]
pub trait CategoryFetcher: Send + Sync {
    fn kind(&self) -> CategoryKind;

    /// Whether the payload embeds player names
    fn needs_player_names(&self) -> bool {
        false
    }

    /// Whether the fetch reads the current season number
    fn needs_season(&self) -> bool {
        false
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError>;
}

/// Fetcher for a category
pub fn fetcher_for(kind: CategoryKind) -> Arc<dyn CategoryFetcher> {
    match kind {
        CategoryKind::Season => Arc::new(SeasonFetcher),
        CategoryKind::Rankings => Arc::new(RankingsFetcher),
        CategoryKind::Upcoming => Arc::new(UpcomingFetcher),
        CategoryKind::Events => Arc::new(EventsFetcher),
        CategoryKind::Scores => Arc::new(ScoresFetcher),
    }
}

/// Runs `fetch` for every configured tour in order and tags the rows with their tour.
///
/// Tours are requested one after another to keep the request rate low.
/// The first failure fails the whole category.
pub(crate) async fn fetch_per_tour<T, F, Fut>(
    tours: &BTreeSet<TourType>,
    mut fetch: F,
) -> Result<Vec<(TourType, T)>, AppError>
where
    F: FnMut(TourType) -> Fut,
    Fut: Future<Output = Result<Vec<T>, AppError>>,
{
    let mut tagged = Vec::new();
    for &tour in tours {
        let rows = fetch(tour).await?;
        debug!(tour = tour.code(), count = rows.len(), "Fetched rows for tour");
        tagged.extend(rows.into_iter().map(|row| (tour, row)));
    }
    Ok(tagged)
}

/// Resolves a player slot and counts placeholders
pub(crate) fn resolve_counting(
    lookup: &dyn Fn(Option<i64>) -> NameLookup,
    player_id: Option<i64>,
    placeholders: &mut usize,
) -> String {
    let resolved = lookup(player_id);
    if resolved.is_placeholder() {
        *placeholders += 1;
    }
    resolved.into_display()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rankings_and_events_read_the_season() {
        let needing: Vec<_> = CategoryKind::ALL
            .into_iter()
            .filter(|kind| fetcher_for(*kind).needs_season())
            .collect();
        assert_eq!(needing, vec![CategoryKind::Rankings, CategoryKind::Events]);
    }

    #[tokio::test]
    async fn test_fetch_per_tour_tags_rows_in_tour_order() {
        let tours = BTreeSet::from([TourType::Women, TourType::MainTour]);
        let tagged = fetch_per_tour(&tours, |tour| async move {
            Ok(vec![format!("{}-1", tour.code()), format!("{}-2", tour.code())])
        })
        .await
        .unwrap();

        let tags: Vec<_> = tagged.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            tags,
            vec![
                TourType::MainTour,
                TourType::MainTour,
                TourType::Women,
                TourType::Women
            ]
        );
        assert_eq!(tagged[2].1, "women-1");
    }

    #[tokio::test]
    async fn test_fetch_per_tour_fails_on_first_error() {
        let tours = BTreeSet::from([TourType::MainTour, TourType::QTour]);
        let result = fetch_per_tour(&tours, |tour| async move {
            if tour == TourType::QTour {
                Err(AppError::upstream_status(500, "q"))
            } else {
                Ok(vec![1])
            }
        })
        .await;
        assert!(matches!(result, Err(AppError::UpstreamStatus { .. })));
    }

    #[test]
    fn test_resolve_counting() {
        let lookup = |id: Option<i64>| match id {
            None => NameLookup::Unassigned,
            Some(1) => NameLookup::Known("Judd Trump".to_string()),
            Some(other) => NameLookup::Unknown(format!("Unknown (#{other})")),
        };
        let mut placeholders = 0;
        assert_eq!(resolve_counting(&lookup, Some(1), &mut placeholders), "Judd Trump");
        assert_eq!(resolve_counting(&lookup, None, &mut placeholders), "TBD");
        assert_eq!(resolve_counting(&lookup, Some(9), &mut placeholders), "Unknown (#9)");
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn test_only_name_bearing_categories_need_names() {
        let needing: Vec<_> = CategoryKind::ALL
            .into_iter()
            .filter(|kind| fetcher_for(*kind).needs_player_names())
            .collect();
        assert_eq!(
            needing,
            vec![
                CategoryKind::Rankings,
                CategoryKind::Upcoming,
                CategoryKind::Scores
            ]
        );
        for kind in CategoryKind::ALL {
            assert_eq!(fetcher_for(kind).kind(), kind);
        }
    }
}
