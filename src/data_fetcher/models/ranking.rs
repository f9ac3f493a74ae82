use super::lenient::{float_or_zero, int_or_zero, opt_id, string_or_empty};
use serde::{Deserialize, Serialize};

/// One row of a ranking list (`rt=<type>&s=<season>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    #[serde(rename = "ID", default, deserialize_with = "opt_id")]
    pub id: Option<i64>,
    #[serde(rename = "Position", default, deserialize_with = "int_or_zero")]
    pub position: i64,
    #[serde(rename = "PlayerID", default, deserialize_with = "opt_id")]
    pub player_id: Option<i64>,
    #[serde(rename = "Season", default, deserialize_with = "int_or_zero")]
    pub season: i64,
    #[serde(rename = "Sum", default, deserialize_with = "float_or_zero")]
    pub sum: f64,
    #[serde(rename = "Type", default, deserialize_with = "string_or_empty")]
    pub ranking_type: String,
    #[serde(rename = "Tour", default)]
    pub tour: Option<String>,
}

impl RankingRow {
    /// Player the row refers to. Older payloads carry it in `ID`.
    pub fn player(&self) -> Option<i64> {
        self.player_id.or(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_row_decodes_upstream_shape() {
        let row: RankingRow = serde_json::from_str(
            r#"{"ID":1001,"Position":1,"PlayerID":5,"Season":2024,"Sum":"1250000","Type":"MoneyRankings"}"#,
        )
        .unwrap();
        assert_eq!(row.position, 1);
        assert_eq!(row.player(), Some(5));
        assert_eq!(row.sum, 1_250_000.0);
        assert_eq!(row.tour, None);
    }

    #[test]
    fn test_player_falls_back_to_id() {
        let row: RankingRow = serde_json::from_str(r#"{"ID":17,"Position":3}"#).unwrap();
        assert_eq!(row.player(), Some(17));
    }
}
