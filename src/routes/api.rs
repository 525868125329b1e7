//! Dancer-facing API handlers
//!
//! Registration, tap logging, history, manual confirm/cancel, highlight
//! stats, and the feedback survey. GET handlers read query parameters;
//! the two POST handlers consume a JSON body.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::{bad_request, error_response, json_response, query_param};
use crate::directory::{NewUser, UniqueField};
use crate::server::AppState;
use crate::stats::dancer_stats;

/// GET /api/check?id= - registration lookup for a chip
pub fn handle_check(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(id) = query_param(query, "id") else {
        return bad_request("id is required");
    };

    match state.directory.get(&id) {
        Some(user) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "registered": true,
                "alias": user.alias,
                "role": user.role,
                "storedKey": user.user_key,
                "feedbackGiven": state.feedback.has_feedback(&id),
            }),
        ),
        None => json_response(StatusCode::OK, &serde_json::json!({ "registered": false })),
    }
}

/// GET /api/unique?field=&value= - advisory uniqueness pre-check
///
/// Registration re-checks authoritatively; this only powers inline form
/// validation.
pub fn handle_unique(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(field) = query_param(query, "field") else {
        return bad_request("field is required");
    };
    let Some(value) = query_param(query, "value") else {
        return bad_request("value is required");
    };
    let Some(field) = UniqueField::parse(&field) else {
        return bad_request("field must be 'alias' or 'email'");
    };

    json_response(
        StatusCode::OK,
        &serde_json::json!({ "unique": !state.directory.exists(field, &value) }),
    )
}

/// POST /api/register - bind a chip to a new user
pub async fn handle_register(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "Failed to read registration body");
            return bad_request("failed to read request body");
        }
    };

    let new_user: NewUser = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return bad_request(&format!("invalid registration payload: {}", e)),
    };

    match state.directory.register(new_user) {
        Ok(user) => json_response(
            StatusCode::CREATED,
            &serde_json::json!({
                "success": true,
                "alias": user.alias,
                "userKey": user.user_key,
            }),
        ),
        Err(e) => error_response(&e),
    }
}

/// GET /api/dance?scannerId=&targetId= - log one tap event
pub fn handle_dance(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(scanner) = query_param(query, "scannerId") else {
        return bad_request("scannerId is required");
    };
    let Some(target) = query_param(query, "targetId") else {
        return bad_request("targetId is required");
    };

    match state.reconciler.log_tap(&scanner, &target, chrono::Utc::now()) {
        Ok(result) => json_response(StatusCode::OK, &result),
        Err(e) => error_response(&e),
    }
}

/// GET /api/history?id= - a user's dance history, newest first
pub fn handle_history(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(id) = query_param(query, "id") else {
        return bad_request("id is required");
    };

    let history = crate::dance::user_history(&state.log, &state.directory, &id);
    json_response(StatusCode::OK, &history)
}

/// GET /api/confirm?rowId= - manually confirm a pending row
pub fn handle_confirm(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(row_id) = row_id_param(query) else {
        return bad_request("rowId must be a positive integer");
    };

    match state.reconciler.confirm_manual(row_id) {
        Ok(()) => json_response(StatusCode::OK, &serde_json::json!({ "success": true })),
        Err(e) => error_response(&e),
    }
}

/// GET /api/cancel?rowId= - retract a pending row
pub fn handle_cancel(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(row_id) = row_id_param(query) else {
        return bad_request("rowId must be a positive integer");
    };

    match state.reconciler.cancel(row_id) {
        Ok(()) => json_response(StatusCode::OK, &serde_json::json!({ "success": true })),
        Err(e) => error_response(&e),
    }
}

/// GET /api/stats?id= - highlight stats over a user's confirmed dances
pub fn handle_stats(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(id) = query_param(query, "id") else {
        return bad_request("id is required");
    };

    let history = crate::dance::user_history(&state.log, &state.directory, &id);
    json_response(StatusCode::OK, &dancer_stats(&history))
}

/// GET /api/feedback/template - the ordered survey question list
pub fn handle_feedback_template(state: &AppState) -> Response<Full<Bytes>> {
    let template = state.feedback.template();
    json_response(StatusCode::OK, &*template)
}

/// Feedback submission body: chip ID plus the answers keyed by question ID
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackPayload {
    chip_id: String,
    #[serde(flatten)]
    answers: BTreeMap<String, serde_json::Value>,
}

/// POST /api/feedback - upsert a user's survey answers
pub async fn handle_submit_feedback(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "Failed to read feedback body");
            return bad_request("failed to read request body");
        }
    };

    let payload: FeedbackPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return bad_request(&format!("invalid feedback payload: {}", e)),
    };

    // Scalar answers become strings; nulls are dropped
    let answers: BTreeMap<String, String> = payload
        .answers
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect();

    match state.feedback.submit(&payload.chip_id, answers) {
        Ok(created) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "success": true, "created": created }),
        ),
        Err(e) => error_response(&e),
    }
}

fn row_id_param(query: Option<&str>) -> Option<u64> {
    query_param(query, "rowId").and_then(|raw| raw.parse::<u64>().ok())
}
