use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::info;

use super::{CategoryFetcher, FetchContext, resolve_counting};
use crate::constants::{RANKINGS_TOP_N, ranking_types};
use crate::data_fetcher::models::{
    CategoryKind, CategoryPayload, RankedPlayer, RankingRow, RankingsPayload, TourType,
};
use crate::data_fetcher::player_names::NameLookup;
use crate::data_fetcher::processors::filter_rankings_by_tour;
use crate::error::AppError;

/// Money and one-year money rankings of the current season
#[derive(Debug, Default, Clone, Copy)]
pub struct RankingsFetcher;

/// Applies the tour filter, keeps the top entries and attaches names.
///
/// Returns the ranked players and the number of placeholder names.
pub fn normalize_rankings(
    rows: Vec<RankingRow>,
    tours: &BTreeSet<TourType>,
    lookup: &dyn Fn(Option<i64>) -> NameLookup,
) -> (Vec<RankedPlayer>, usize) {
    let mut placeholders = 0;
    let ranked = filter_rankings_by_tour(rows, tours)
        .into_iter()
        .take(RANKINGS_TOP_N)
        .map(|(row, tour)| {
            let player_id = row.player();
            RankedPlayer {
                position: row.position,
                player_id,
                player_name: resolve_counting(lookup, player_id, &mut placeholders),
                sum: row.sum,
                tour,
            }
        })
        .collect();
    (ranked, placeholders)
}

#[async_trait]
impl CategoryFetcher for RankingsFetcher {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Rankings
    }

    fn needs_player_names(&self) -> bool {
        true
    }

    fn needs_season(&self) -> bool {
        true
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError> {
        let season = ctx.current_season().await?;
        let money = ctx.api.rankings(season, ranking_types::MONEY).await?;
        let one_year = ctx
            .api
            .rankings(season, ranking_types::ONE_YEAR_MONEY)
            .await?;

        let lookup = |id| ctx.lookup_name(id);
        let (top10_money, money_placeholders) = normalize_rankings(money, &ctx.tours, &lookup);
        let (top10_one_year_money, one_year_placeholders) =
            normalize_rankings(one_year, &ctx.tours, &lookup);
        let placeholder_names = money_placeholders + one_year_placeholders;

        info!(
            season,
            money = top10_money.len(),
            one_year = top10_one_year_money.len(),
            placeholder_names,
            "Rankings normalized"
        );
        Ok(CategoryPayload::Rankings(RankingsPayload {
            season,
            top10_money,
            top10_one_year_money,
            placeholder_names,
        }))
    }
}
