//! HTTP metrics middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::infrastructure::observability::record_http_request;

/// Records a counter and a latency histogram per method, route and status
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    // Matched route pattern keeps label cardinality bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
