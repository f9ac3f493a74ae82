mod common;

use chrono::Utc;
use common::{RecordingSleeper, api_for, main_tour, mount_rankings, mount_season, ranking_row};
use serde_json::json;
use snooker_stats::coordinator::SnapshotStore;
use snooker_stats::data_fetcher::cache::{PlayerNameCache, PlayerRecord};
use snooker_stats::data_fetcher::categories::{FetchContext, fetcher_for};
use snooker_stats::data_fetcher::models::{CategoryKind, TourType};
use snooker_stats::data_fetcher::processors::MatchStatus;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn context(server: &MockServer, tours: BTreeSet<TourType>) -> (TempDir, FetchContext) {
    let dir = tempdir().unwrap();
    let names = PlayerNameCache::open(&dir.path().join("players.json"), Duration::from_secs(60))
        .await
        .unwrap();
    let ctx = FetchContext {
        api: api_for(server, RecordingSleeper::new()),
        names,
        tours,
        snapshots: Arc::new(SnapshotStore::new()),
    };
    (dir, ctx)
}

fn cached(id: i64, name: &str) -> PlayerRecord {
    PlayerRecord {
        id,
        name: name.to_string(),
        fetched_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_rankings_keep_only_configured_tour_in_upstream_order() {
    let server = MockServer::start().await;
    mount_season(&server, 2024).await;
    mount_rankings(
        &server,
        "MoneyRankings",
        json!([
            ranking_row(1, 101, Some("main")),
            ranking_row(2, 202, Some("q")),
            ranking_row(3, 303, Some("main")),
        ]),
    )
    .await;
    mount_rankings(&server, "OneYearMoneyRankings", json!([])).await;

    let (_dir, ctx) = context(&server, main_tour()).await;
    ctx.names
        .insert_records(vec![cached(101, "Judd Trump")])
        .await
        .unwrap();

    let payload = fetcher_for(CategoryKind::Rankings).fetch(&ctx).await.unwrap();
    let rankings = payload.as_rankings().unwrap();

    let ids: Vec<_> = rankings.top10_money.iter().map(|p| p.player_id).collect();
    assert_eq!(ids, vec![Some(101), Some(303)]);
    assert_eq!(rankings.top10_money[0].player_name, "Judd Trump");
    assert_eq!(rankings.top10_money[1].player_name, "Unknown (#303)");
    assert!(rankings.top10_one_year_money.is_empty());
    assert_eq!(rankings.placeholder_names, 1);
    assert_eq!(rankings.season, 2024);

    // The miss was queued for background resolution, not fetched inline
    assert_eq!(ctx.names.pending_lookups(), 1);
}

#[tokio::test]
async fn test_upcoming_matches_are_tagged_per_tour() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "14"))
        .and(query_param("tr", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ID": 11, "EventID": 1450, "Player1ID": 1, "Player2ID": 0, "ScheduledDate": "2024-05-02 10:00:00" },
            { "ID": 12, "EventID": 1450, "Player1ID": 1, "Player2ID": 2, "ScheduledDate": "" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "14"))
        .and(query_param("tr", "women"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": 21, "EventID": 1500, "Player1ID": 7, "Player2ID": 8, "ScheduledDate": "2024-05-01 09:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tours = BTreeSet::from([TourType::MainTour, TourType::Women]);
    let (_dir, ctx) = context(&server, tours).await;

    let payload = fetcher_for(CategoryKind::Upcoming).fetch(&ctx).await.unwrap();
    let upcoming = payload.as_upcoming().unwrap();

    assert_eq!(upcoming.count, 2);
    assert_eq!(upcoming.matches[0].match_id, 21);
    assert_eq!(upcoming.matches[0].tour, TourType::Women);
    assert_eq!(upcoming.matches[1].player2_name, "TBD");
}

#[tokio::test]
async fn test_scores_join_event_snapshot_and_classify() {
    let server = MockServer::start().await;
    mount_season(&server, 2024).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "5"))
        .and(query_param("s", "2024"))
        .and(query_param("tr", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ID": 1450, "Name": "World Championship", "Type": "Ranking", "City": "Sheffield" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ID": 3, "EventID": 1450, "Player1ID": 1, "Player2ID": 2, "Unfinished": true,
              "ScheduledDate": "2024-05-01 13:00:00", "EndDate": "" },
            { "ID": 4, "EventID": 1450, "Player1ID": 1, "Player2ID": 2, "Unfinished": false,
              "ScheduledDate": "2024-05-01 10:00:00", "EndDate": "2024-05-01 12:40:00" }
        ])))
        .mount(&server)
        .await;

    let (_dir, ctx) = context(&server, main_tour()).await;
    let events = fetcher_for(CategoryKind::Events).fetch(&ctx).await.unwrap();
    ctx.snapshots.publish(events, &ctx.tours);

    let payload = fetcher_for(CategoryKind::Scores).fetch(&ctx).await.unwrap();
    let scores = payload.as_scores().unwrap();

    assert_eq!(scores.matches[0].match_id, 4);
    assert_eq!(scores.matches[0].state, MatchStatus::Finished);
    assert_eq!(scores.matches[1].state, MatchStatus::InPlay);
    assert_eq!(scores.matches[1].event_name, "World Championship");
    assert_eq!(scores.placeholder_names, 4);
}

#[tokio::test]
async fn test_category_failure_is_returned_not_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_dir, ctx) = context(&server, main_tour()).await;
    let err = fetcher_for(CategoryKind::Season).fetch(&ctx).await.unwrap_err();
    assert!(err.is_upstream_error());
}
