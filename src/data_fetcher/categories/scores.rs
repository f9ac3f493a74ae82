use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::info;

use super::{CategoryFetcher, FetchContext, fetch_per_tour, resolve_counting};
use crate::data_fetcher::models::{
    CategoryKind, CategoryPayload, EventRow, MatchRow, ScoreMatch, ScoresPayload, TourType,
};
use crate::data_fetcher::player_names::NameLookup;
use crate::data_fetcher::processors::determine_match_status;
use crate::error::AppError;

/// Currently running matches with live scores (`t=17`)
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoresFetcher;

/// Joins event metadata, classifies every match and sorts by (scheduled date, match id).
pub fn normalize_scores(
    rows: Vec<(TourType, MatchRow)>,
    events: &BTreeMap<i64, EventRow>,
    lookup: &dyn Fn(Option<i64>) -> NameLookup,
) -> ScoresPayload {
    let mut placeholder_names = 0;
    let mut matches: Vec<ScoreMatch> = rows
        .into_iter()
        .map(|(tour, row)| {
            let event = row.event_id.and_then(|id| events.get(&id));
            let state = determine_match_status(&row);
            ScoreMatch {
                tour,
                match_id: row.id,
                event_id: row.event_id,
                event_name: event.map(|e| e.name.clone()).unwrap_or_default(),
                event_type: event.map(|e| e.event_type.clone()).unwrap_or_default(),
                event_city: event.map(|e| e.city.clone()).unwrap_or_default(),
                player1_id: row.player1_id,
                player1_name: resolve_counting(lookup, row.player1_id, &mut placeholder_names),
                score1: row.score1,
                player2_id: row.player2_id,
                player2_name: resolve_counting(lookup, row.player2_id, &mut placeholder_names),
                score2: row.score2,
                status: row.status,
                unfinished: row.unfinished,
                scheduled_date: row.scheduled_date,
                start_date: row.start_date,
                end_date: row.end_date,
                state,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then(a.match_id.cmp(&b.match_id))
    });

    ScoresPayload {
        count: matches.len(),
        matches,
        placeholder_names,
    }
}

#[async_trait]
impl CategoryFetcher for ScoresFetcher {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Scores
    }

    fn needs_player_names(&self) -> bool {
        true
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError> {
        let rows = fetch_per_tour(&ctx.tours, |tour| ctx.api.current_matches(tour)).await?;

        let events_snapshot = ctx.snapshots.get(CategoryKind::Events);
        let empty = BTreeMap::new();
        let events = events_snapshot
            .as_ref()
            .and_then(|snap| snap.payload.as_ref()?.as_events())
            .map_or(&empty, |payload| &payload.events_by_id);

        let payload = normalize_scores(rows, events, &|id| ctx.lookup_name(id));
        info!(
            count = payload.count,
            placeholder_names = payload.placeholder_names,
            "Live scores normalized"
        );
        Ok(CategoryPayload::Scores(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::processors::MatchStatus;

    fn names(id: Option<i64>) -> NameLookup {
        match id {
            None => NameLookup::Unassigned,
            Some(id) => NameLookup::Known(format!("Player {id}")),
        }
    }

    fn live(id: i64, scheduled: &str, unfinished: bool, end: &str) -> MatchRow {
        MatchRow {
            id,
            event_id: Some(1450),
            player1_id: Some(1),
            player2_id: Some(2),
            unfinished,
            scheduled_date: scheduled.to_string(),
            end_date: end.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scores_joined_classified_and_sorted() {
        let events = BTreeMap::from([(
            1450,
            EventRow {
                id: 1450,
                name: "World Championship".to_string(),
                event_type: "Ranking".to_string(),
                city: "Sheffield".to_string(),
                ..Default::default()
            },
        )]);
        let rows = vec![
            (TourType::MainTour, live(9, "2024-05-01 13:00:00", false, "")),
            (TourType::MainTour, live(7, "2024-05-01 13:00:00", true, "")),
            (
                TourType::MainTour,
                live(3, "2024-05-01 10:00:00", false, "2024-05-01 12:40:00"),
            ),
        ];

        let payload = normalize_scores(rows, &events, &names);

        let ids: Vec<_> = payload.matches.iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![3, 7, 9]);
        let states: Vec<_> = payload.matches.iter().map(|m| m.state).collect();
        assert_eq!(
            states,
            vec![
                MatchStatus::Finished,
                MatchStatus::InPlay,
                MatchStatus::StartingSoon
            ]
        );
        assert_eq!(payload.matches[0].event_city, "Sheffield");
        assert_eq!(payload.placeholder_names, 0);
    }

    #[test]
    fn test_missing_event_metadata_is_blank() {
        let rows = vec![(TourType::Women, live(1, "2024-05-01", true, ""))];
        let payload = normalize_scores(rows, &BTreeMap::new(), &names);
        assert_eq!(payload.matches[0].event_name, "");
        assert_eq!(payload.matches[0].tour, TourType::Women);
    }
}
