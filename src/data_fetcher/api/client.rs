//! Typed snooker.org endpoints on top of the rate-aware fetcher

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::fetch_utils::{RateAwareFetcher, RetryPolicy, Sleeper};
use super::http_client::create_http_client_with_timeout;
use super::normalize::{first_from_body, rows_from_body};
use super::urls::{
    build_current_matches_url, build_current_season_url, build_player_url, build_rankings_url,
    build_season_events_url, build_upcoming_matches_url,
};
use crate::config::Config;
use crate::data_fetcher::models::{EventRow, MatchRow, PlayerRow, RankingRow, SeasonInfo, TourType};
use crate::error::AppError;

/// snooker.org API client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SnookerApi {
    fetcher: RateAwareFetcher,
    base_url: String,
}

impl SnookerApi {
    pub fn new(fetcher: RateAwareFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client from the configured domain, header value, timeout and retry table.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(config.http_timeout())?;
        let fetcher = RateAwareFetcher::new(
            client,
            config.requested_by.clone(),
            RetryPolicy::from(&config.retry),
        );
        Ok(Self::new(fetcher, config.base_url()))
    }

    /// Replaces the delay primitive used for retry backoff
    pub fn with_sleeper(self, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            fetcher: self.fetcher.with_sleeper(sleeper),
            base_url: self.base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> &RateAwareFetcher {
        &self.fetcher
    }

    async fn rows<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, AppError> {
        let response = self.fetcher.fetch(url).await?;
        let rows = rows_from_body(&response.body, url)?;
        debug!(count = rows.len(), "Decoded rows from {url}");
        Ok(rows)
    }

    /// Current season (`t=20`)
    #[instrument(skip(self))]
    pub async fn current_season(&self) -> Result<SeasonInfo, AppError> {
        let url = build_current_season_url(&self.base_url);
        let response = self.fetcher.fetch(&url).await?;
        let info: Option<SeasonInfo> = first_from_body(&response.body, &url)?;
        info.ok_or_else(|| AppError::api_unexpected_structure("empty season payload", &url))
    }

    /// Current season number
    pub async fn current_season_number(&self) -> Result<i64, AppError> {
        let info = self.current_season().await?;
        let url = build_current_season_url(&self.base_url);
        info.season_number()
            .ok_or_else(|| AppError::api_unexpected_structure("season number missing", url))
    }

    #[instrument(skip(self))]
    pub async fn rankings(
        &self,
        season: i64,
        ranking_type: &str,
    ) -> Result<Vec<RankingRow>, AppError> {
        self.rows(&build_rankings_url(&self.base_url, ranking_type, season))
            .await
    }

    #[instrument(skip(self))]
    pub async fn upcoming_matches(&self, tour: TourType) -> Result<Vec<MatchRow>, AppError> {
        self.rows(&build_upcoming_matches_url(&self.base_url, tour.code()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn events_in_season(
        &self,
        season: i64,
        tour: Option<TourType>,
    ) -> Result<Vec<EventRow>, AppError> {
        self.rows(&build_season_events_url(
            &self.base_url,
            season,
            tour.map(TourType::code),
        ))
        .await
    }

    #[instrument(skip(self))]
    pub async fn current_matches(&self, tour: TourType) -> Result<Vec<MatchRow>, AppError> {
        self.rows(&build_current_matches_url(&self.base_url, tour.code()))
            .await
    }

    /// Single player by id; `None` when the API has no such player
    #[instrument(skip(self))]
    pub async fn player(&self, player_id: i64) -> Result<Option<PlayerRow>, AppError> {
        let url = build_player_url(&self.base_url, player_id);
        let response = self.fetcher.fetch(&url).await?;
        let player: Option<PlayerRow> = first_from_body(&response.body, &url)?;
        if player.is_none() {
            info!("No player record returned for id {player_id}");
        }
        Ok(player)
    }
}
