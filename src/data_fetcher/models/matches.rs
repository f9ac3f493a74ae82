use super::lenient::{int_or_zero, opt_id, string_or_empty, truthy};
use serde::{Deserialize, Serialize};

/// Match row shared by the upcoming (`t=14`) and current (`t=17`) endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(rename = "ID", default, deserialize_with = "int_or_zero")]
    pub id: i64,
    #[serde(rename = "EventID", default, deserialize_with = "opt_id")]
    pub event_id: Option<i64>,
    #[serde(rename = "Round", default, deserialize_with = "int_or_zero")]
    pub round: i64,
    #[serde(rename = "Number", default, deserialize_with = "int_or_zero")]
    pub number: i64,
    #[serde(rename = "Player1ID", default, deserialize_with = "opt_id")]
    pub player1_id: Option<i64>,
    #[serde(rename = "Score1", default, deserialize_with = "int_or_zero")]
    pub score1: i64,
    #[serde(rename = "Player2ID", default, deserialize_with = "opt_id")]
    pub player2_id: Option<i64>,
    #[serde(rename = "Score2", default, deserialize_with = "int_or_zero")]
    pub score2: i64,
    #[serde(rename = "WinnerID", default, deserialize_with = "opt_id")]
    pub winner_id: Option<i64>,
    #[serde(rename = "Unfinished", default, deserialize_with = "truthy")]
    pub unfinished: bool,
    #[serde(rename = "Status", default, deserialize_with = "int_or_zero")]
    pub status: i64,
    #[serde(rename = "ScheduledDate", default, deserialize_with = "string_or_empty")]
    pub scheduled_date: String,
    #[serde(rename = "StartDate", default, deserialize_with = "string_or_empty")]
    pub start_date: String,
    #[serde(rename = "EndDate", default, deserialize_with = "string_or_empty")]
    pub end_date: String,
}

impl MatchRow {
    /// Scheduled date, falling back to the actual start when none was published
    pub fn effective_schedule(&self) -> Option<&str> {
        [self.scheduled_date.as_str(), self.start_date.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_row_decodes_live_score() {
        let row: MatchRow = serde_json::from_str(
            r#"{"ID":9001,"EventID":"1450","Player1ID":5,"Score1":3,"Player2ID":0,"Score2":2,
                "Unfinished":true,"Status":1,"ScheduledDate":"2024-05-01 13:00:00","EndDate":""}"#,
        )
        .unwrap();
        assert_eq!(row.id, 9001);
        assert_eq!(row.event_id, Some(1450));
        assert_eq!(row.player2_id, None);
        assert!(row.unfinished);
        assert_eq!(row.effective_schedule(), Some("2024-05-01 13:00:00"));
    }

    #[test]
    fn test_effective_schedule_falls_back_to_start_date() {
        let row = MatchRow {
            start_date: "2024-05-02 10:00:00".to_string(),
            ..Default::default()
        };
        assert_eq!(row.effective_schedule(), Some("2024-05-02 10:00:00"));
        assert_eq!(MatchRow::default().effective_schedule(), None);
    }
}
