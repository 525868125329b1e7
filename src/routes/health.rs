//! Liveness and version endpoints

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    healthy: bool,
    status: &'static str,
    version: &'static str,
    node_id: String,
    uptime_secs: u64,
    dancers: usize,
    log_rows: usize,
    timestamp: String,
}

/// GET /health
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    let payload = HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.args.node_id.to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
        dancers: state.directory.len(),
        log_rows: state.log.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    json_response(StatusCode::OK, &payload)
}

/// GET /version
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
