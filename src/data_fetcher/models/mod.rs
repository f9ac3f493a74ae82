pub mod event;
pub mod lenient;
pub mod matches;
pub mod payload;
pub mod players;
pub mod ranking;
pub mod season;
pub mod tour;

pub use event::EventRow;
pub use matches::MatchRow;
pub use payload::{
    CategoryKind, CategoryPayload, EventsPayload, RankedPlayer, RankingsPayload, ScoreMatch,
    ScoresPayload, SeasonPayload, UpcomingMatch, UpcomingPayload,
};
pub use players::PlayerRow;
pub use ranking::RankingRow;
pub use season::SeasonInfo;
pub use tour::TourType;
