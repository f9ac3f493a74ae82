//! Player name derivation and placeholder handling.

mod formatting;

pub use formatting::{
    NameLookup, build_full_name, create_fallback_name, display_name_from_row, unknown_placeholder,
};
