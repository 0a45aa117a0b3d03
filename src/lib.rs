//! Stockwatch: a small dashboard service that keeps a refreshed snapshot of
//! technology stock quotes and serves it over HTTP.

pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;
