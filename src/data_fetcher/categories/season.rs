use async_trait::async_trait;
use tracing::info;

use super::{CategoryFetcher, FetchContext};
use crate::data_fetcher::api::build_current_season_url;
use crate::data_fetcher::models::{CategoryKind, CategoryPayload, SeasonPayload};
use crate::error::AppError;

/// Current season (`t=20`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SeasonFetcher;

#[async_trait]
impl CategoryFetcher for SeasonFetcher {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Season
    }

    async fn fetch(&self, ctx: &FetchContext) -> Result<CategoryPayload, AppError> {
        let info = ctx.api.current_season().await?;
        let season = info.season_number().ok_or_else(|| {
            AppError::api_unexpected_structure(
                "season number missing",
                build_current_season_url(ctx.api.base_url()),
            )
        })?;
        info!(season, "Current season");
        Ok(CategoryPayload::Season(SeasonPayload { season, info }))
    }
}
