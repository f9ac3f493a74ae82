pub mod match_status;
pub mod schedule_time;
pub mod tour_filter;

pub use match_status::{MatchStatus, classify_match, determine_match_status};
pub use schedule_time::parse_schedule_time;
pub use tour_filter::filter_rankings_by_tour;
