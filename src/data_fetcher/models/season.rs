use super::lenient::opt_id;
use serde::{Deserialize, Serialize};

/// Current-season row (`t=20`). The season number has appeared under several keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonInfo {
    #[serde(rename = "Season", default, deserialize_with = "opt_id")]
    pub season: Option<i64>,
    #[serde(rename = "ID", default, deserialize_with = "opt_id")]
    pub id: Option<i64>,
    #[serde(rename = "CurrentSeason", default, deserialize_with = "opt_id")]
    pub current_season: Option<i64>,
    #[serde(rename = "SeasonID", default, deserialize_with = "opt_id")]
    pub season_id: Option<i64>,
}

impl SeasonInfo {
    /// First season number found, in key priority order
    pub fn season_number(&self) -> Option<i64> {
        self.season
            .or(self.id)
            .or(self.current_season)
            .or(self.season_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_key_priority() {
        let info: SeasonInfo = serde_json::from_str(r#"{"Season":2024,"ID":7}"#).unwrap();
        assert_eq!(info.season_number(), Some(2024));

        let info: SeasonInfo = serde_json::from_str(r#"{"CurrentSeason":"2023"}"#).unwrap();
        assert_eq!(info.season_number(), Some(2023));

        let info: SeasonInfo = serde_json::from_str(r#"{"Other":1}"#).unwrap();
        assert_eq!(info.season_number(), None);
    }
}
