//! HTTP surface: the drawing page and the `/solve` endpoint.
//!
//! Two routes, one state value:
//!
//! - `GET /` serves the embedded drawing/upload page
//! - `POST /solve` runs [`solve_request`] on the submitted payload
//!
//! The endpoint always answers HTTP 200 with a `{expression, result}` body —
//! failure is a string in `result`, not a status code, so the page's fetch
//! handler has exactly one shape to deal with. A body that does not
//! deserialize is treated the same as a missing image rather than a 422.

use crate::config::SolveConfig;
use crate::error::SnapsolveError;
use crate::solve::{solve_request, SolveReply, SolveRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The self-contained drawing/upload page. No external assets, so the server
/// stays a single binary.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared per-process state: just the immutable config.
#[derive(Clone)]
pub struct AppState {
    config: Arc<SolveConfig>,
}

/// Build the application router.
///
/// Permissive CORS so the page can be served from elsewhere during
/// development; `TraceLayer` gives per-request spans under `RUST_LOG=debug`.
pub fn router(config: Arc<SolveConfig>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/solve", post(solve_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { config })
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn solve_handler(
    State(state): State<AppState>,
    body: Result<Json<SolveRequest>, JsonRejection>,
) -> Json<SolveReply> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            // Unreadable body → same branch as an absent image.
            warn!("Unreadable request body: {rejection}");
            SolveRequest::default()
        }
    };
    Json(solve_request(&state.config, &request.image).await)
}

/// Bind `addr` and serve until the process is stopped.
///
/// # Errors
/// [`SnapsolveError::Internal`] when the listener cannot bind or the server
/// loop fails; request-level failures never surface here.
pub async fn run(config: SolveConfig, addr: SocketAddr) -> Result<(), SnapsolveError> {
    if !config.recognizer_available() {
        warn!("Tesseract not found; /solve will answer with the install hint");
    }

    let app = router(Arc::new(config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SnapsolveError::Internal(format!("could not bind {addr}: {e}")))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| SnapsolveError::Internal(format!("server error: {e}")))
}
