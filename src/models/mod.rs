//! Shared data models spanning the fetch, store and presentation layers.

pub mod quote;
pub mod snapshot;
pub mod view;

pub use quote::Quote;
pub use snapshot::{RefreshOutcome, Snapshot};
pub use view::StockView;
