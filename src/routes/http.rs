// GET handlers: metrics, fallback

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::AppState;
use crate::exposition::CONTENT_TYPE;

pub const NOT_READY_BODY: &str = "metrics not yet available\n";
pub const NOT_FOUND_BODY: &str = "Not found\n";

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// GET /metrics: latest snapshot plus a trailing `# collected_at <unix secs>`
/// comment; 503 until the first cycle has succeeded.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Some(snapshot) = state.cache.load() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, PLAIN_TEXT)],
            NOT_READY_BODY.to_string(),
        );
    };

    let mut body = String::with_capacity(snapshot.document.len() + 32);
    body.push_str(&snapshot.document);
    body.push_str(&format!("# collected_at {}\n", snapshot.completed_at_secs()));
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

pub(super) async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, PLAIN_TEXT)],
        NOT_FOUND_BODY,
    )
}
