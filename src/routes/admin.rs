//! Organizer dashboard handlers

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use super::{bad_request, json_response, query_param};
use crate::server::AppState;
use crate::stats::admin_stats;

/// GET /admin/stats - floor-wide aggregation for the dashboard
pub fn handle_admin_stats(state: &AppState) -> Response<Full<Bytes>> {
    let stats = admin_stats(
        &state.directory,
        &state.log,
        &state.feedback,
        state.args.admin_log_limit,
        chrono::Utc::now(),
    );
    json_response(StatusCode::OK, &stats)
}

/// GET /admin/search?query= - find a dancer by alias or full name
pub fn handle_admin_search(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(needle) = query_param(query, "query") else {
        return bad_request("query is required");
    };

    match state.directory.search(&needle) {
        Some(user) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "found": true,
                "chipId": user.chip_id,
                "alias": user.alias,
                "fullName": user.full_name,
                "email": user.email,
                "role": user.role,
            }),
        ),
        None => json_response(StatusCode::OK, &serde_json::json!({ "found": false })),
    }
}
