//! Normalized payloads published per category.

use super::event::EventRow;
use super::season::SeasonInfo;
use super::tour::TourType;
use crate::data_fetcher::processors::MatchStatus;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The five independently refreshed data kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Season,
    Rankings,
    Upcoming,
    Events,
    Scores,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 5] = [
        CategoryKind::Season,
        CategoryKind::Rankings,
        CategoryKind::Upcoming,
        CategoryKind::Events,
        CategoryKind::Scores,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryKind::Season => "season",
            CategoryKind::Rankings => "rankings",
            CategoryKind::Upcoming => "upcoming",
            CategoryKind::Events => "events",
            CategoryKind::Scores => "scores",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| AppError::config_error(format!("Unknown category '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonPayload {
    pub season: i64,
    pub info: SeasonInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlayer {
    pub position: i64,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub sum: f64,
    pub tour: TourType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingsPayload {
    pub season: i64,
    pub top10_money: Vec<RankedPlayer>,
    pub top10_one_year_money: Vec<RankedPlayer>,
    pub placeholder_names: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingMatch {
    pub tour: TourType,
    pub match_id: i64,
    pub event_id: Option<i64>,
    pub scheduled_date: String,
    pub player1_id: Option<i64>,
    pub player1_name: String,
    pub player2_id: Option<i64>,
    pub player2_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingPayload {
    pub count: usize,
    pub matches: Vec<UpcomingMatch>,
    pub placeholder_names: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsPayload {
    pub season: i64,
    pub events: Vec<EventRow>,
    pub events_by_id: BTreeMap<i64, EventRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMatch {
    pub tour: TourType,
    pub match_id: i64,
    pub event_id: Option<i64>,
    pub event_name: String,
    pub event_type: String,
    pub event_city: String,
    pub player1_id: Option<i64>,
    pub player1_name: String,
    pub score1: i64,
    pub player2_id: Option<i64>,
    pub player2_name: String,
    pub score2: i64,
    pub status: i64,
    pub unfinished: bool,
    pub scheduled_date: String,
    pub start_date: String,
    pub end_date: String,
    pub state: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoresPayload {
    pub count: usize,
    pub matches: Vec<ScoreMatch>,
    pub placeholder_names: usize,
}

/// Category-specific structured value held by a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum CategoryPayload {
    Season(SeasonPayload),
    Rankings(RankingsPayload),
    Upcoming(UpcomingPayload),
    Events(EventsPayload),
    Scores(ScoresPayload),
}

impl CategoryPayload {
    pub fn kind(&self) -> CategoryKind {
        match self {
            CategoryPayload::Season(_) => CategoryKind::Season,
            CategoryPayload::Rankings(_) => CategoryKind::Rankings,
            CategoryPayload::Upcoming(_) => CategoryKind::Upcoming,
            CategoryPayload::Events(_) => CategoryKind::Events,
            CategoryPayload::Scores(_) => CategoryKind::Scores,
        }
    }

    /// Number of player names that were still placeholders when the payload was built
    pub fn placeholder_names(&self) -> usize {
        match self {
            CategoryPayload::Rankings(p) => p.placeholder_names,
            CategoryPayload::Upcoming(p) => p.placeholder_names,
            CategoryPayload::Scores(p) => p.placeholder_names,
            CategoryPayload::Season(_) | CategoryPayload::Events(_) => 0,
        }
    }

    pub fn as_season(&self) -> Option<&SeasonPayload> {
        match self {
            CategoryPayload::Season(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_rankings(&self) -> Option<&RankingsPayload> {
        match self {
            CategoryPayload::Rankings(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_upcoming(&self) -> Option<&UpcomingPayload> {
        match self {
            CategoryPayload::Upcoming(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_events(&self) -> Option<&EventsPayload> {
        match self {
            CategoryPayload::Events(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_scores(&self) -> Option<&ScoresPayload> {
        match self {
            CategoryPayload::Scores(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_parse_back() {
        for kind in CategoryKind::ALL {
            assert_eq!(kind.name().parse::<CategoryKind>().unwrap(), kind);
        }
        assert!("weather".parse::<CategoryKind>().is_err());
    }

    #[test]
    fn test_payload_serializes_with_category_tag() {
        let payload = CategoryPayload::Season(SeasonPayload {
            season: 2024,
            info: SeasonInfo {
                season: Some(2024),
                ..Default::default()
            },
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["category"], "season");
        assert_eq!(json["season"], 2024);
        assert_eq!(payload.kind(), CategoryKind::Season);
        assert_eq!(payload.placeholder_names(), 0);
    }
}
