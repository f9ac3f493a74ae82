pub mod bootstrap;
pub mod player_cache;
pub mod store;

pub use bootstrap::{BootstrapOutcome, ranked_player_ids, run_bootstrap};
pub use player_cache::PlayerNameCache;
pub use store::{BootstrapState, CacheDocument, PlayerRecord};
