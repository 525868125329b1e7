//! HTTP route handlers
//!
//! One file per surface: liveness probes, the dancer-facing API, and the
//! organizer dashboard. Handlers build `Response<Full<Bytes>>` directly;
//! the (method, path) dispatch lives in `server::http`.

pub mod admin;
pub mod api;
pub mod health;

pub use admin::{handle_admin_search, handle_admin_stats};
pub use api::{
    handle_cancel, handle_check, handle_confirm, handle_dance, handle_feedback_template,
    handle_history, handle_register, handle_stats, handle_submit_feedback, handle_unique,
};
pub use health::{health_check, version_info};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::types::FloorError;

/// Serialize a value as a JSON response with permissive CORS
pub(crate) fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Map a domain error to its HTTP status and a JSON error body
pub(crate) fn error_response(err: &FloorError) -> Response<Full<Bytes>> {
    let status = match err {
        FloorError::InvalidRequest(_) | FloorError::SelfTap => StatusCode::BAD_REQUEST,
        FloorError::UnknownRow(_) => StatusCode::NOT_FOUND,
        FloorError::RowState(_, _) | FloorError::Conflict(_) => StatusCode::CONFLICT,
        FloorError::Template(_) | FloorError::Io(_) | FloorError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_response(status, &serde_json::json!({ "error": err.to_string() }))
}

/// 400 with a plain message
pub(crate) fn bad_request(message: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({ "error": message }),
    )
}

/// Extract a query string parameter, percent-decoded
pub(crate) fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    let query = query?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| percent_decode(v))
}

/// Minimal percent-decoding for query values ('+' and %XX escapes)
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match u8::from_str_radix(&value[i + 1..i + 3], 16) {
                    Ok(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    Err(_) => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_basic() {
        let q = Some("scannerId=chipA&targetId=chipB");
        assert_eq!(query_param(q, "scannerId").as_deref(), Some("chipA"));
        assert_eq!(query_param(q, "targetId").as_deref(), Some("chipB"));
        assert_eq!(query_param(q, "missing"), None);
        assert_eq!(query_param(None, "scannerId"), None);
    }

    #[test]
    fn test_query_param_decoding() {
        let q = Some("query=ana+banana&other=caf%C3%A9");
        assert_eq!(query_param(q, "query").as_deref(), Some("ana banana"));
        assert_eq!(query_param(q, "other").as_deref(), Some("café"));
    }

    #[test]
    fn test_percent_decode_malformed_passthrough() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
