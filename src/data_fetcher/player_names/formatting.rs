//! Player display name derivation and placeholder texts.

use crate::constants::placeholders::TO_BE_DECIDED;
use crate::data_fetcher::models::PlayerRow;

/// Builds a full name from first and last name components, ignoring blanks.
///
/// # Example
/// ```
/// use snooker_stats::data_fetcher::player_names::build_full_name;
///
/// assert_eq!(build_full_name("Judd", "Trump"), "Judd Trump");
/// assert_eq!(build_full_name("", "Trump"), "Trump");
/// ```
pub fn build_full_name(first_name: &str, last_name: &str) -> String {
    [first_name.trim(), last_name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name used when the API returned a player without any name fields
pub fn create_fallback_name(player_id: i64) -> String {
    format!("Player {player_id}")
}

/// Placeholder returned for an identifier the cache does not know yet
///
/// # Example
/// ```
/// use snooker_stats::data_fetcher::player_names::unknown_placeholder;
///
/// assert_eq!(unknown_placeholder(1234), "Unknown (#1234)");
/// ```
pub fn unknown_placeholder(player_id: i64) -> String {
    format!("Unknown (#{player_id})")
}

/// Derives the display name of a player row.
///
/// Prefers a ready-made `Name`, `FullName` or `DisplayName`, then
/// `FirstName LastName`, and finally `Player <id>`.
pub fn display_name_from_row(row: &PlayerRow, player_id: i64) -> String {
    [&row.name, &row.full_name, &row.display_name]
        .into_iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let full = build_full_name(&row.first_name, &row.last_name);
            if full.is_empty() {
                create_fallback_name(row.id.unwrap_or(player_id))
            } else {
                full
            }
        })
}

/// Outcome of a non-blocking name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameLookup {
    /// The cache holds a name
    Known(String),
    /// The identifier is not cached yet; carries the placeholder text
    Unknown(String),
    /// No player assigned to the slot (absent or zero id)
    Unassigned,
}

impl NameLookup {
    pub fn display(&self) -> &str {
        match self {
            NameLookup::Known(name) | NameLookup::Unknown(name) => name,
            NameLookup::Unassigned => TO_BE_DECIDED,
        }
    }

    pub fn into_display(self) -> String {
        match self {
            NameLookup::Known(name) | NameLookup::Unknown(name) => name,
            NameLookup::Unassigned => TO_BE_DECIDED.to_string(),
        }
    }

    /// Whether the display text is a stand-in for a real name that should exist
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NameLookup::Unknown(_))
    }
}
