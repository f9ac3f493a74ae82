//! Payload shape normalization.
//!
//! Depending on the endpoint and the number of results, snooker.org returns
//! a list, a single object, a one-element list wrapping an object, or an
//! empty body. Callers always get either a list of decoded rows or an
//! optional single row.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

fn parse_value(body: &str, url: &str) -> Result<Option<Value>, AppError> {
    if body.trim().is_empty() {
        debug!("Empty body from {url}, treating as no rows");
        return Ok(None);
    }
    super::fetch_utils::parse_json::<Value>(body, url).map(Some)
}

fn decode_row<T: DeserializeOwned>(value: Value, url: &str) -> Option<T> {
    match serde_json::from_value::<T>(value) {
        Ok(row) => Some(row),
        Err(e) => {
            debug!("Skipping undecodable row from {url}: {e}");
            None
        }
    }
}

/// Decodes a body into rows. Objects become a single row; rows that do not decode are skipped.
pub fn rows_from_body<T: DeserializeOwned>(body: &str, url: &str) -> Result<Vec<T>, AppError> {
    match parse_value(body, url)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| decode_row(item, url))
            .collect()),
        Some(object @ Value::Object(_)) => Ok(decode_row(object, url).into_iter().collect()),
        Some(other) => Err(AppError::api_unexpected_structure(
            format!("expected a list or an object, got {}", json_kind(&other)),
            url,
        )),
    }
}

/// Decodes a body into at most one row, taking the first object of a list.
pub fn first_from_body<T: DeserializeOwned>(body: &str, url: &str) -> Result<Option<T>, AppError> {
    match parse_value(body, url)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .find(Value::is_object)
            .and_then(|item| decode_row(item, url))),
        Some(object @ Value::Object(_)) => Ok(decode_row(object, url)),
        Some(other) => Err(AppError::api_unexpected_structure(
            format!("expected an object, got {}", json_kind(&other)),
            url,
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::{PlayerRow, SeasonInfo};

    const URL: &str = "https://api.snooker.org/?t=0";

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Strict {
        #[serde(rename = "ID")]
        id: i64,
    }

    #[test]
    fn test_rows_accept_list_and_object() {
        let rows: Vec<Strict> = rows_from_body(r#"[{"ID":1},{"ID":2}]"#, URL).unwrap();
        assert_eq!(rows, vec![Strict { id: 1 }, Strict { id: 2 }]);

        let rows: Vec<Strict> = rows_from_body(r#"{"ID":3}"#, URL).unwrap();
        assert_eq!(rows, vec![Strict { id: 3 }]);
    }

    #[test]
    fn test_rows_skip_undecodable_entries() {
        let rows: Vec<Strict> = rows_from_body(r#"[{"ID":1},{"ID":"x"},7,{"ID":4}]"#, URL).unwrap();
        assert_eq!(rows, vec![Strict { id: 1 }, Strict { id: 4 }]);
    }

    #[test]
    fn test_empty_and_null_bodies_are_no_rows() {
        assert!(rows_from_body::<Strict>("", URL).unwrap().is_empty());
        assert!(rows_from_body::<Strict>("null", URL).unwrap().is_empty());
        assert!(first_from_body::<SeasonInfo>("[]", URL).unwrap().is_none());
    }

    #[test]
    fn test_scalar_body_is_unexpected_structure() {
        assert!(matches!(
            rows_from_body::<Strict>("42", URL),
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
        assert!(matches!(
            first_from_body::<Strict>("\"text\"", URL),
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
    }

    #[test]
    fn test_first_unwraps_single_element_list() {
        let player: Option<PlayerRow> =
            first_from_body(r#"[{"ID":5,"FirstName":"Ronnie","LastName":"O'Sullivan"}]"#, URL)
                .unwrap();
        assert_eq!(player.unwrap().id, Some(5));
    }
}
