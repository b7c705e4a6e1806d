// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::SnapshotCache;

pub use http::{NOT_FOUND_BODY, NOT_READY_BODY};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) cache: Arc<SnapshotCache>,
}

/// Router serving the cached exposition document. Reads only; collection runs
/// elsewhere.
pub fn app(cache: Arc<SnapshotCache>) -> Router {
    let state = AppState { cache };
    Router::new()
        .route(
            "/metrics",
            get(http::metrics_handler).fallback(http::not_found_handler),
        ) // GET /metrics; other methods get the plain 404
        .fallback(http::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
