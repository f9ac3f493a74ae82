use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::info;

use super::{CategoryFetcher, FetchContext, fetch_per_tour};
use crate::data_fetcher::models::{CategoryKind, CategoryPayload, EventRow, EventsPayload};
use crate::error::AppError;

/// Events of the current season (`t=5`)
#[derive(Debug, Default, Clone, Copy)]
pub struct EventsFetcher;

/// De-duplicates by event id (first occurrence wins) and sorts by id.
pub fn normalize_events(season: i64, rows: Vec<EventRow>) -> EventsPayload {
    let mut events_by_id = BTreeMap::new();
    for row in rows.into_iter().filter(|row| row.id > 0) {
        events_by_id.entry(row.id).or_insert(row);
    }
    EventsPayload {
        season,
        events: events_by_id.values().cloned().collect(),
        events_by_id,
    }
}

#[async_trait]
impl CategoryFetcher for EventsFetcher {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Events
    }

    fn needs_season(&self) -> bool {
        true
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError> {
        let season = ctx.current_season().await?;
        let rows = if ctx.tours.is_empty() {
            ctx.api.events_in_season(season, None).await?
        } else {
            fetch_per_tour(&ctx.tours, |tour| {
                ctx.api.events_in_season(season, Some(tour))
            })
            .await?
            .into_iter()
            .map(|(_, row)| row)
            .collect()
        };

        let payload = normalize_events(season, rows);
        info!(season, count = payload.events.len(), "Season events normalized");
        Ok(CategoryPayload::Events(payload))
    }
}
