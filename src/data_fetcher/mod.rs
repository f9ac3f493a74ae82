pub mod api;
pub mod cache;
pub mod categories;
pub mod models;
pub mod player_names;
pub mod processors;

pub use api::SnookerApi;
pub use cache::PlayerNameCache;
pub use categories::{CategoryFetcher, FetchContext, fetcher_for};
pub use models::{CategoryKind, CategoryPayload, TourType};
