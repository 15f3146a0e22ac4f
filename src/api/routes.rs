//! API Routes
//!
//! HTTP endpoints for peer wins, the dashboard page, health and metrics

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::Metrics;
use crate::chain::{ChainError, ChainReader};
use crate::config::DashboardConfig;
use crate::dashboard::{self, DashboardQuery, PageView};
use crate::mock;
use crate::peers;
use crate::types::{ApiResponse, ErrorResponse};

/// Hint returned when the provider rate limits us
pub const RATE_LIMIT_SUGGESTION: &str =
    "You are being rate limited. Try setting USE_MOCK_DATA=true in your configuration.";

/// Shared API state
pub struct ApiState {
    pub config: Arc<DashboardConfig>,
    /// `None` when no RPC endpoint or contract is configured
    pub reader: Option<Arc<ChainReader>>,
    pub metrics: Arc<Metrics>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of a peer wins request
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No peer IDs found")]
    NoPeers,

    #[error("Failed to fetch peer data")]
    Fetch(#[from] ChainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoPeers => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error
    pub fn to_body(&self) -> ErrorResponse {
        match self {
            ApiError::NoPeers => ErrorResponse::new(self.to_string()),
            ApiError::Fetch(cause) => {
                let suggestion = cause
                    .is_rate_limited()
                    .then(|| RATE_LIMIT_SUGGESTION.to_string());
                ErrorResponse::new(self.to_string())
                    .with_details(cause.to_string())
                    .with_suggestion(suggestion)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

// =============================================================================
// SERVER
// =============================================================================

/// Build the router with CORS and request tracing
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        // Dashboard
        .route("/", get(get_dashboard))

        // Peer wins
        .route("/api/peer-wins", get(get_peer_wins))

        // Health & Status
        .route("/health", get(health_check))
        .route("/status", get(get_status))

        // Metrics
        .route("/metrics", get(get_metrics_prometheus))
        .route("/metrics/json", get(get_metrics_json))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Run the HTTP API server
pub async fn run_api_server(
    config: Arc<DashboardConfig>,
    reader: Option<Arc<ChainReader>>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let state = Arc::new(ApiState {
        config: config.clone(),
        reader,
        metrics,
    });

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    info!("📊 Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// PEER WINS
// =============================================================================

/// Per-request override of the configured mock flag
#[derive(Debug, Default, Deserialize)]
pub struct PeerWinsQuery {
    pub mock: Option<bool>,
}

/// Load peer ids and resolve them from the mock provider or the chain
pub async fn resolve_peer_wins(state: &ApiState, use_mock: bool) -> Result<ApiResponse, ApiError> {
    state.metrics.inc_requests();

    let peer_ids = peers::load_peer_ids(&state.config.peer_ids_file).await;
    if peer_ids.is_empty() {
        info!("No peer IDs configured in {:?}", state.config.peer_ids_file);
        state.metrics.inc_not_found();
        return Err(ApiError::NoPeers);
    }

    let result = if use_mock {
        Ok(mock::mock_data(&peer_ids))
    } else {
        match &state.reader {
            Some(reader) => reader.fetch_data(&peer_ids).await,
            None => Err(ChainError::NotConfigured),
        }
    };

    match result {
        Ok(response) => {
            state.metrics.record_success(&response, use_mock);
            Ok(response)
        }
        Err(e) => {
            error!("Error fetching peer data: {}", e);
            state.metrics.record_failure(e.is_rate_limited());
            Err(ApiError::Fetch(e))
        }
    }
}

/// GET /api/peer-wins - Peer records and round info
async fn get_peer_wins(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PeerWinsQuery>,
) -> Result<Json<ApiResponse>, ApiError> {
    let use_mock = query.mock.unwrap_or(state.config.use_mock_data);
    resolve_peer_wins(&state, use_mock).await.map(Json)
}

/// GET / - Server-rendered dashboard
async fn get_dashboard(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    state.metrics.inc_page_renders();

    let use_mock = query.mock.unwrap_or(state.config.use_mock_data);
    let (status, result) = match resolve_peer_wins(&state, use_mock).await {
        Ok(response) => (StatusCode::OK, Ok(response)),
        Err(e) => (e.status(), Err(e.to_body())),
    };

    let view = PageView {
        result: &result,
        sort: query.sort_state(),
        use_mock_data: use_mock,
        explorer_url: &state.config.explorer_url,
        generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };

    (status, Html(dashboard::render_page(&view)))
}

// =============================================================================
// HEALTH & METRICS
// =============================================================================

/// GET /health - Simple health check
async fn health_check() -> impl IntoResponse {
    "OK"
}

/// GET /status - Service configuration summary
async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let status = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.metrics.uptime_secs(),
        "use_mock_data": state.config.use_mock_data,
        "chain_configured": state.reader.is_some(),
        "contract_address": state.config.contract_address,
        "peer_ids_file": state.config.peer_ids_file.display().to_string(),
    });

    Json(status)
}

/// GET /metrics - Prometheus format metrics
async fn get_metrics_prometheus(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
}

/// GET /metrics/json - JSON format metrics
async fn get_metrics_json(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::reader::tests::FakeContract;
    use crate::retry::RetryPolicy;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::path::Path;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state_for(
        peer_file: &Path,
        use_mock: bool,
        contract: Option<FakeContract>,
    ) -> Arc<ApiState> {
        let mut config = DashboardConfig::default().with_mock_data(Some(use_mock));
        config.peer_ids_file = peer_file.to_path_buf();

        let reader = contract.map(|c| {
            Arc::new(ChainReader::new(
                Arc::new(c),
                RetryPolicy::new(3, Duration::from_millis(1)),
                Duration::ZERO,
            ))
        });

        Arc::new(ApiState {
            config: Arc::new(config),
            reader,
            metrics: Arc::new(Metrics::new()),
        })
    }

    async fn get(state: Arc<ApiState>, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn peer_file(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("peer-ids.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_peer_list_is_404_in_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "\n\n");

        for use_mock in [true, false] {
            let state = state_for(&path, use_mock, Some(FakeContract::default()));
            let (status, body) = get(state.clone(), "/api/peer-wins").await;

            assert_eq!(status, StatusCode::NOT_FOUND);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json, serde_json::json!({ "error": "No peer IDs found" }));
            // Never reached the chain
            assert_eq!(
                state.metrics.not_found.load(std::sync::atomic::Ordering::Relaxed),
                1
            );
        }
    }

    #[tokio::test]
    async fn test_missing_peer_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(&dir.path().join("absent.txt"), true, None);

        let (status, _) = get(state, "/api/peer-wins").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mock_mode_returns_shape_without_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "peerA\npeerB\n");
        // No reader at all: mock mode must not need one
        let state = state_for(&path, true, None);

        let (status, body) = get(state, "/api/peer-wins").await;

        assert_eq!(status, StatusCode::OK);
        let response: ApiResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.peers.len(), 2);
        assert_eq!(response.peers[0].peer_id, "peerA");
        assert_eq!(response.peers[1].peer_id, "peerB");
        for peer in &response.peers {
            assert_eq!(peer.wallet_address.len(), 42);
            assert!(peer.total_wins < 100);
        }
    }

    #[tokio::test]
    async fn test_live_mode_reads_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "one\nthree\n");
        let state = state_for(&path, false, Some(FakeContract::default()));

        let (status, body) = get(state, "/api/peer-wins").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["peers"][0]["peerId"], "one");
        assert_eq!(json["peers"][0]["totalWins"], 30);
        assert_eq!(json["peers"][1]["totalWins"], 50);
        assert_eq!(json["roundInfo"]["currentRound"], 9);
        assert_eq!(json["roundInfo"]["currentStage"], 2);
    }

    #[tokio::test]
    async fn test_query_overrides_mock_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "peerA\n");
        // Live by default, but the chain always fails
        let state = state_for(
            &path,
            false,
            Some(FakeContract {
                always_fail: true,
                ..Default::default()
            }),
        );

        let (status, _) = get(state.clone(), "/api/peer-wins?mock=true").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get(state, "/api/peer-wins").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_rate_limited_failure_has_suggestion() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "peerA\n");
        let state = state_for(
            &path,
            false,
            Some(FakeContract {
                always_fail: true,
                ..Default::default()
            }),
        );

        let (status, body) = get(state.clone(), "/api/peer-wins").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Failed to fetch peer data");
        assert!(error.details.unwrap().contains("rate limit"));
        assert_eq!(error.suggestion.as_deref(), Some(RATE_LIMIT_SUGGESTION));
        assert_eq!(
            state
                .metrics
                .rate_limited_failures
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_other_failure_has_no_suggestion() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "peerA\npeerB\n");
        let state = state_for(
            &path,
            false,
            Some(FakeContract {
                eoa_count_override: Some(1),
                ..Default::default()
            }),
        );

        let (status, body) = get(state, "/api/peer-wins").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["details"], "getEoa returned 1 addresses for 2 peer ids");
        assert!(json.get("suggestion").is_none());
    }

    #[tokio::test]
    async fn test_live_mode_without_chain_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "peerA\n");
        let state = state_for(&path, false, None);

        let (status, body) = get(state, "/api/peer-wins").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.details.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_dashboard_page_renders_sorted_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "a\nccc\nbb\n");
        let state = state_for(&path, false, Some(FakeContract::default()));

        let (status, body) = get(state, "/?sort=totalWins&dir=desc").await;

        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        // Wins are 10 x id length, so descending order is ccc, bb, a
        let ccc = html.find(">ccc<").unwrap();
        let bb = html.find(">bb<").unwrap();
        let a = html.find(">a<").unwrap();
        assert!(ccc < bb && bb < a);
    }

    #[tokio::test]
    async fn test_dashboard_page_shows_404_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = peer_file(&dir, "");
        let state = state_for(&path, true, None);

        let (status, body) = get(state, "/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8(body).unwrap().contains("No peer IDs found"));
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(&dir.path().join("absent.txt"), true, None);

        let (status, body) = get(state.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        get(state.clone(), "/api/peer-wins").await;
        let (status, body) = get(state, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("peer_wins_not_found_total 1"));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::NoPeers.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Fetch(ChainError::NotConfigured).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
