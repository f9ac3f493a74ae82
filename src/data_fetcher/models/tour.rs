use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tours published by snooker.org, identified by their `tr` query code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TourType {
    #[serde(rename = "main")]
    MainTour,
    #[serde(rename = "q")]
    QTour,
    #[serde(rename = "seniors")]
    Seniors,
    #[serde(rename = "women")]
    Women,
}

impl TourType {
    pub const ALL: [TourType; 4] = [
        TourType::MainTour,
        TourType::QTour,
        TourType::Seniors,
        TourType::Women,
    ];

    /// Code used by the `tr` query parameter
    pub fn code(self) -> &'static str {
        match self {
            TourType::MainTour => "main",
            TourType::QTour => "q",
            TourType::Seniors => "seniors",
            TourType::Women => "women",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TourType::MainTour => "Main Tour",
            TourType::QTour => "Q Tour",
            TourType::Seniors => "Seniors",
            TourType::Women => "Women",
        }
    }

    /// Interprets the tour code found on a ranking row.
    /// Rows without a code belong to the main tour; unknown codes yield `None`.
    pub fn from_row_code(code: Option<&str>) -> Option<TourType> {
        match code.map(str::trim) {
            None | Some("") => Some(TourType::MainTour),
            Some(code) => code.parse().ok(),
        }
    }
}

impl fmt::Display for TourType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TourType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(TourType::MainTour),
            "q" => Ok(TourType::QTour),
            "seniors" => Ok(TourType::Seniors),
            "women" => Ok(TourType::Women),
            other => Err(AppError::config_error(format!(
                "Unknown tour '{other}', expected one of main, q, seniors, women"
            ))),
        }
    }
}
