use crate::data_fetcher::models::{RankingRow, TourType};
use std::collections::BTreeSet;

/// Keeps the ranking rows that belong to one of the configured tours,
/// preserving upstream order. Rows without a tour code count as main tour.
pub fn filter_rankings_by_tour(
    rows: Vec<RankingRow>,
    tours: &BTreeSet<TourType>,
) -> Vec<(RankingRow, TourType)> {
    let total = rows.len();
    let kept: Vec<_> = rows
        .into_iter()
        .filter_map(|row| {
            let tour = TourType::from_row_code(row.tour.as_deref())?;
            tours.contains(&tour).then_some((row, tour))
        })
        .collect();

    if kept.len() != total {
        tracing::debug!(
            total,
            kept = kept.len(),
            "Tour filter dropped ranking rows"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(player: i64, tour: Option<&str>) -> RankingRow {
        RankingRow {
            player_id: Some(player),
            position: player,
            tour: tour.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_main_tour_filter_keeps_order() {
        let rows = vec![row(1, Some("main")), row(2, Some("q")), row(3, Some("main"))];
        let tours = BTreeSet::from([TourType::MainTour]);

        let kept = filter_rankings_by_tour(rows, &tours);

        let players: Vec<_> = kept.iter().map(|(r, _)| r.player()).collect();
        assert_eq!(players, vec![Some(1), Some(3)]);
        assert!(kept.iter().all(|(_, t)| *t == TourType::MainTour));
    }

    #[test]
    fn test_untagged_rows_count_as_main_tour() {
        let rows = vec![row(1, None), row(2, Some("women"))];

        let only_women = filter_rankings_by_tour(rows.clone(), &BTreeSet::from([TourType::Women]));
        assert_eq!(only_women.len(), 1);
        assert_eq!(only_women[0].0.player(), Some(2));

        let only_main = filter_rankings_by_tour(rows, &BTreeSet::from([TourType::MainTour]));
        assert_eq!(only_main.len(), 1);
        assert_eq!(only_main[0].0.player(), Some(1));
    }

    #[test]
    fn test_unknown_tour_codes_are_dropped() {
        let rows = vec![row(1, Some("ebsa"))];
        let all = BTreeSet::from(TourType::ALL);
        assert!(filter_rankings_by_tour(rows, &all).is_empty());
    }
}
