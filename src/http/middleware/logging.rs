//! Request/response logging middleware.
//!
//! Logs a `REQ` line with method, path, request ID and the head of the body,
//! then a `RES` line with status and latency once the handler returns.

use std::time::Instant;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy)]
pub struct LogSettings {
    /// Bytes of body echoed into the log line.
    pub body_limit: usize,
    /// Largest body buffered at all.
    pub max_body_size: usize,
}

pub async fn log_requests(
    State(settings): State<LogSettings>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();

    let (parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, settings.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, error = %e, "Request body rejected");
            metrics::record_request(method.as_str(), 413, start);
            return ApiError::PayloadTooLarge(settings.max_body_size).into_response();
        }
    };

    let shown = &bytes[..bytes.len().min(settings.body_limit)];
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        body = %String::from_utf8_lossy(shown),
        "REQ"
    );

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        status = status.as_u16(),
        method = %method,
        path = %path,
        latency_ms = start.elapsed().as_millis() as u64,
        "RES"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}
