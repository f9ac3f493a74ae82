//! Snooker statistics coordinator for the snooker.org API
//!
//! Fetches seasons, rankings, upcoming matches, events and live scores from
//! a rate-limited upstream, resolves player ids through a persistent name
//! cache, and publishes one snapshot per category for downstream readers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use snooker_stats::config::Config;
//! use snooker_stats::coordinator::RefreshCoordinator;
//! use snooker_stats::data_fetcher::models::CategoryKind;
//! use snooker_stats::error::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let coordinator = RefreshCoordinator::open(&config).await?;
//!
//!     let summary = coordinator.refresh_all().await;
//!     println!("failed: {:?}", summary.failed());
//!
//!     if let Some(snapshot) = coordinator.snapshot(CategoryKind::Rankings) {
//!         println!("{}", serde_json::to_string_pretty(&*snapshot)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod data_fetcher;
pub mod error;

// Re-export commonly used types for convenience
pub use config::Config;
pub use coordinator::{CategorySnapshot, RefreshCoordinator, RefreshSummary, SnapshotStore};
pub use data_fetcher::models::{CategoryKind, CategoryPayload, TourType};
pub use data_fetcher::{PlayerNameCache, SnookerApi};
pub use error::AppError;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
