use super::lenient::{int_or_zero, string_or_empty};
use serde::{Deserialize, Serialize};

/// Event row from the season events endpoint (`t=5`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(rename = "ID", default, deserialize_with = "int_or_zero")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(rename = "Type", default, deserialize_with = "string_or_empty")]
    pub event_type: String,
    #[serde(rename = "City", default, deserialize_with = "string_or_empty")]
    pub city: String,
    #[serde(rename = "Venue", default, deserialize_with = "string_or_empty")]
    pub venue: String,
    #[serde(rename = "Country", default, deserialize_with = "string_or_empty")]
    pub country: String,
    #[serde(rename = "StartDate", default, deserialize_with = "string_or_empty")]
    pub start_date: String,
    #[serde(rename = "EndDate", default, deserialize_with = "string_or_empty")]
    pub end_date: String,
    #[serde(rename = "Tour", default, deserialize_with = "string_or_empty")]
    pub tour: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_row_tolerates_nulls() {
        let row: EventRow = serde_json::from_str(
            r#"{"ID":"1450","Name":"World Championship","Type":"Ranking","City":"Sheffield","Venue":null}"#,
        )
        .unwrap();
        assert_eq!(row.id, 1450);
        assert_eq!(row.city, "Sheffield");
        assert_eq!(row.venue, "");
    }
}
