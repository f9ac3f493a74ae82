#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use snooker_stats::config::Config;
use snooker_stats::data_fetcher::api::{
    RateAwareFetcher, RetryPolicy, Sleeper, SnookerApi, create_http_client_with_timeout,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_HEADER_VALUE: &str = "SnookerStatsTests";

/// Records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Cancels `token` on the n-th sleep, simulating a shutdown in the middle of a paced sweep
#[derive(Debug)]
pub struct CancellingSleeper {
    remaining: Mutex<u32>,
    token: CancellationToken,
}

impl CancellingSleeper {
    pub fn after(sleeps: u32, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(sleeps),
            token,
        })
    }
}

#[async_trait]
impl Sleeper for CancellingSleeper {
    async fn sleep(&self, _duration: Duration) {
        let cancel_now = {
            let mut remaining = self.remaining.lock().unwrap();
            *remaining = remaining.saturating_sub(1);
            *remaining == 0
        };
        if cancel_now {
            self.token.cancel();
        }
        tokio::task::yield_now().await;
    }
}

pub fn fetcher_with(
    header: &str,
    timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
) -> RateAwareFetcher {
    let client = create_http_client_with_timeout(timeout).unwrap();
    RateAwareFetcher::new(client, header, RetryPolicy::default()).with_sleeper(sleeper)
}

pub fn api_for(server: &MockServer, sleeper: Arc<dyn Sleeper>) -> SnookerApi {
    SnookerApi::new(
        fetcher_with(TEST_HEADER_VALUE, Duration::from_secs(5), sleeper),
        server.uri(),
    )
}

pub fn test_config(server: &MockServer, cache_path: &std::path::Path) -> Config {
    let mut config = Config {
        api_domain: server.uri(),
        requested_by: TEST_HEADER_VALUE.to_string(),
        player_cache_path: Some(cache_path.to_string_lossy().to_string()),
        ..Config::default()
    };
    config.schedule.enabled = false;
    config.bootstrap.enabled = false;
    config
}

pub fn main_tour() -> BTreeSet<snooker_stats::TourType> {
    BTreeSet::from([snooker_stats::TourType::MainTour])
}

pub fn ranking_row(position: i64, player_id: i64, tour: Option<&str>) -> Value {
    json!({
        "ID": position,
        "Position": position,
        "PlayerID": player_id,
        "Season": 2024,
        "Sum": 100_000 - position * 1000,
        "Type": "MoneyRankings",
        "Tour": tour,
    })
}

pub fn player_row(id: i64, first: &str, last: &str) -> Value {
    json!({ "ID": id, "FirstName": first, "LastName": last, "Nationality": "England" })
}

pub async fn mount_season(server: &MockServer, season: i64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "ID": season, "CurrentSeason": season }])))
        .mount(server)
        .await;
}

pub async fn mount_rankings(server: &MockServer, ranking_type: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("rt", ranking_type))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

pub async fn mount_player(server: &MockServer, id: i64, first: &str, last: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("p", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([player_row(id, first, last)])))
        .mount(server)
        .await;
}
