//! Metrics Collection
//!
//! Counters for the peer wins endpoint and the dashboard page.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::types::ApiResponse;

/// Metrics collector for the dashboard service
#[derive(Default)]
pub struct Metrics {
    /// Start time for uptime calculation
    start_time: Option<Instant>,

    /// Requests that reached the peer wins resolver (API and page)
    pub requests: AtomicU64,

    /// Responses served from the mock provider
    pub mock_responses: AtomicU64,

    /// Responses served from the chain
    pub live_responses: AtomicU64,

    /// Requests answered 404 (no peer ids)
    pub not_found: AtomicU64,

    /// Requests answered 500
    pub failures: AtomicU64,

    /// Failures whose cause was provider rate limiting
    pub rate_limited_failures: AtomicU64,

    /// Dashboard page renders
    pub page_renders: AtomicU64,

    /// Peers in the last successful response
    pub last_peer_count: AtomicU64,

    /// Round in the last successful response
    pub last_round: AtomicU64,

    /// Stage in the last successful response
    pub last_stage: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_page_renders(&self) {
        self.page_renders.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed request
    pub fn record_failure(&self, rate_limited: bool) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        if rate_limited {
            self.rate_limited_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a successful response and its gauges
    pub fn record_success(&self, response: &ApiResponse, mock: bool) {
        if mock {
            self.mock_responses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.live_responses.fetch_add(1, Ordering::Relaxed);
        }
        self.last_peer_count
            .store(response.peers.len() as u64, Ordering::Relaxed);
        self.last_round
            .store(response.round_info.current_round, Ordering::Relaxed);
        self.last_stage
            .store(response.round_info.current_stage, Ordering::Relaxed);
    }

    /// (name, kind, help, value) for every exported series
    fn series(&self) -> Vec<(&'static str, &'static str, &'static str, u64)> {
        let load = |v: &AtomicU64| v.load(Ordering::Relaxed);
        vec![
            ("uptime_seconds", "gauge", "Service uptime in seconds", self.uptime_secs()),
            ("requests_total", "counter", "Peer wins requests", load(&self.requests)),
            (
                "mock_responses_total",
                "counter",
                "Responses built from mock data",
                load(&self.mock_responses),
            ),
            (
                "live_responses_total",
                "counter",
                "Responses read from the chain",
                load(&self.live_responses),
            ),
            (
                "not_found_total",
                "counter",
                "Requests with no peer ids configured",
                load(&self.not_found),
            ),
            ("failures_total", "counter", "Requests that failed", load(&self.failures)),
            (
                "rate_limited_total",
                "counter",
                "Failures caused by provider rate limiting",
                load(&self.rate_limited_failures),
            ),
            ("page_renders_total", "counter", "Dashboard page renders", load(&self.page_renders)),
            (
                "peers",
                "gauge",
                "Peers in the last successful response",
                load(&self.last_peer_count),
            ),
            (
                "current_round",
                "gauge",
                "Round in the last successful response",
                load(&self.last_round),
            ),
            (
                "current_stage",
                "gauge",
                "Stage in the last successful response",
                load(&self.last_stage),
            ),
        ]
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();
        for (name, kind, help, value) in self.series() {
            let _ = write!(
                output,
                "# HELP peer_wins_{name} {help}\n\
                 # TYPE peer_wins_{name} {kind}\n\
                 peer_wins_{name} {value}\n\n"
            );
        }
        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_secs": self.uptime_secs(),
            "requests": {
                "total": self.requests.load(Ordering::Relaxed),
                "mock": self.mock_responses.load(Ordering::Relaxed),
                "live": self.live_responses.load(Ordering::Relaxed),
                "not_found": self.not_found.load(Ordering::Relaxed),
                "failed": self.failures.load(Ordering::Relaxed),
                "rate_limited": self.rate_limited_failures.load(Ordering::Relaxed),
            },
            "page_renders": self.page_renders.load(Ordering::Relaxed),
            "last_response": {
                "peers": self.last_peer_count.load(Ordering::Relaxed),
                "current_round": self.last_round.load(Ordering::Relaxed),
                "current_stage": self.last_stage.load(Ordering::Relaxed),
            },
        })
    }
}
