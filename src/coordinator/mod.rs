//! Scheduling, coalescing and publication of category refreshes.

pub mod calendar;
pub mod refresh_coordinator;
pub mod scheduler;
pub mod snapshot_store;

pub use calendar::{CalendarEvent, project_calendar};
pub use refresh_coordinator::{
    BootstrapProgress, CategoryStatus, CoordinatorStatus, FetchJob, Phase, RefreshCoordinator,
    RefreshResult, RefreshSummary, Trigger,
};
pub use scheduler::category_intervals;
pub use snapshot_store::{CategorySnapshot, SnapshotStore, SnapshotUpdate};
