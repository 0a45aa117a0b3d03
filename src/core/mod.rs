//! Core application primitives (snapshot store, refresh loop, HTTP surface)

pub mod http;
pub mod market_hours;
pub mod presenter;
pub mod runtime;
pub mod scheduler;
pub mod snapshot;

pub use http::{create_router, start_server, AppState, HealthStatus};
pub use market_hours::is_market_open;
pub use presenter::{view, SortKey};
pub use runtime::{RefreshService, RefreshTrigger};
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use snapshot::SnapshotStore;
