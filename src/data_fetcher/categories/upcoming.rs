use async_trait::async_trait;
use tracing::{debug, info};

use super::{CategoryFetcher, FetchContext, fetch_per_tour, resolve_counting};
use crate::data_fetcher::models::{
    CategoryKind, CategoryPayload, MatchRow, TourType, UpcomingMatch, UpcomingPayload,
};
use crate::data_fetcher::player_names::NameLookup;
use crate::error::AppError;

/// Upcoming matches of every configured tour (`t=14`)
#[derive(Debug, Default, Clone, Copy)]
pub struct UpcomingFetcher;

/// Drops unscheduled rows, attaches names and sorts by scheduled date.
pub fn normalize_upcoming(
    rows: Vec<(TourType, MatchRow)>,
    lookup: &dyn Fn(Option<i64>) -> NameLookup,
) -> UpcomingPayload {
    let total = rows.len();
    let mut placeholder_names = 0;
    let mut matches: Vec<UpcomingMatch> = rows
        .into_iter()
        .filter_map(|(tour, row)| {
            let scheduled_date = row.effective_schedule()?.to_string();
            Some(UpcomingMatch {
                tour,
                match_id: row.id,
                event_id: row.event_id,
                scheduled_date,
                player1_id: row.player1_id,
                player1_name: resolve_counting(lookup, row.player1_id, &mut placeholder_names),
                player2_id: row.player2_id,
                player2_name: resolve_counting(lookup, row.player2_id, &mut placeholder_names),
            })
        })
        .collect();

    if matches.len() != total {
        debug!(
            dropped = total - matches.len(),
            "Dropped upcoming matches without a schedule"
        );
    }

    matches.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then(a.match_id.cmp(&b.match_id))
    });

    UpcomingPayload {
        count: matches.len(),
        matches,
        placeholder_names,
    }
}

#[async_trait]
impl CategoryFetcher for UpcomingFetcher {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Upcoming
    }

    fn needs_player_names(&self) -> bool {
        true
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError> {
        let rows = fetch_per_tour(&ctx.tours, |tour| ctx.api.upcoming_matches(tour)).await?;
        let payload = normalize_upcoming(rows, &|id| ctx.lookup_name(id));
        info!(
            count = payload.count,
            placeholder_names = payload.placeholder_names,
            "Upcoming matches normalized"
        );
        Ok(CategoryPayload::Upcoming(payload))
    }
}
