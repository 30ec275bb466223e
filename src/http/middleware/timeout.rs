use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

use crate::http::error::ApiError;

/// Bound the time a handler may take before the client gets a 408.
///
/// Work a handler hands to a spawned task keeps running after the deadline.
pub async fn request_timeout(
    State(limit): State<Duration>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %uri, limit_secs = limit.as_secs(), "request timed out");
            ApiError::RequestTimeout.into_response()
        }
    }
}
