//! HTTP server implementation
//!
//! hyper http1 with TokioIo for async handling. One task per connection;
//! every response is a small JSON body, so `Full<Bytes>` is enough.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::dance::{InteractionLog, Reconciler};
use crate::directory::UserDirectory;
use crate::feedback::FeedbackStore;
use crate::routes;
use crate::types::Result;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Process start, for the health uptime field
    pub started: Instant,
    /// Chip -> registered user
    pub directory: Arc<UserDirectory>,
    /// Append-only dance interaction log
    pub log: Arc<InteractionLog>,
    /// Tap reconciliation over directory + log
    pub reconciler: Reconciler,
    /// Survey template and per-user answers
    pub feedback: Arc<FeedbackStore>,
}

impl AppState {
    pub fn new(args: Args) -> Self {
        let directory = Arc::new(UserDirectory::new());
        let log = Arc::new(InteractionLog::new());
        let reconciler = Reconciler::new(Arc::clone(&directory), Arc::clone(&log), args.window());

        Self {
            args,
            started: Instant::now(),
            directory,
            log,
            reconciler,
            feedback: Arc::new(FeedbackStore::new()),
        }
    }
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Floorpulse listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());
    let query = query.as_deref();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(&state),

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // Registration surface
        (Method::GET, "/api/check") => routes::handle_check(&state, query),
        (Method::GET, "/api/unique") => routes::handle_unique(&state, query),
        (Method::POST, "/api/register") => routes::handle_register(req, Arc::clone(&state)).await,

        // Tap logging and the rows it produces
        (Method::GET, "/api/dance") => routes::handle_dance(&state, query),
        (Method::GET, "/api/history") => routes::handle_history(&state, query),
        (Method::GET, "/api/confirm") => routes::handle_confirm(&state, query),
        (Method::GET, "/api/cancel") => routes::handle_cancel(&state, query),
        (Method::GET, "/api/stats") => routes::handle_stats(&state, query),

        // Feedback survey
        (Method::GET, "/api/feedback/template") => routes::handle_feedback_template(&state),
        (Method::POST, "/api/feedback") => {
            routes::handle_submit_feedback(req, Arc::clone(&state)).await
        }

        // Organizer dashboard
        (Method::GET, "/admin/stats") => routes::handle_admin_stats(&state),
        (Method::GET, "/admin/search") => routes::handle_admin_search(&state, query),

        _ => not_found_response(&path),
    };

    Ok(response)
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
