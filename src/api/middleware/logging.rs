//! Request/response logging middleware with header redaction

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

/// Logs each request and its outcome.
/// `TraceLayer` already opens the request span, so no span is created here.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let request_id = extract_request_id(request.headers());
    let headers_log = redact_headers(request.headers());

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            request_id = %request_id,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            request_id = %request_id,
            "Request completed"
        );
    }

    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn extract_request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn redact_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name, value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "x-real-ip"
            | "authorization"
    )
}
