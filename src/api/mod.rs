//! HTTP API Module
//!
//! Serves the peer wins endpoint and the dashboard page.
//! Also exposes health and metrics endpoints for monitoring.

mod metrics;
mod routes;

pub use metrics::Metrics;
pub use routes::run_api_server;
