//! Observability facade: tracing export and metric-recording decorators

pub mod instrument;
pub mod otel;

pub use instrument::{record_cycle, InstrumentedProvider, InstrumentedSource};
