use super::lenient::{opt_id, string_or_empty};
use serde::{Deserialize, Serialize};

/// Player row from the `p=<id>` endpoint.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PlayerRow {
    #[serde(rename = "ID", default, deserialize_with = "opt_id")]
    pub id: Option<i64>,
    #[serde(rename = "FirstName", default, deserialize_with = "string_or_empty")]
    pub first_name: String,
    #[serde(rename = "MiddleName", default, deserialize_with = "string_or_empty")]
    pub middle_name: String,
    #[serde(rename = "LastName", default, deserialize_with = "string_or_empty")]
    pub last_name: String,
    #[serde(rename = "Name", default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(rename = "FullName", default, deserialize_with = "string_or_empty")]
    pub full_name: String,
    #[serde(rename = "DisplayName", default, deserialize_with = "string_or_empty")]
    pub display_name: String,
    #[serde(rename = "Nationality", default, deserialize_with = "string_or_empty")]
    pub nationality: String,
}
