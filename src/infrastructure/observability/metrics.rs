//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MetricsConfig;

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("valid path pattern"));

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("spending_tracker_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Count business events such as created transactions or registrations
pub fn record_event(name: &'static str) {
    counter!("spending_tracker_events_total", "event" => name).increment(1);
}

/// Replace numeric ids with a placeholder to bound label cardinality
fn sanitize_path(path: &str) -> String {
    let path = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    // Overlapping matches like /1/2 need a second pass
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/transactions/123"), "/transactions/{id}");
        assert_eq!(
            sanitize_path("/groups/4/members/17"),
            "/groups/{id}/members/{id}"
        );
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/analytics/by-date"), "/analytics/by-date");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };
        assert!(init_metrics(&config).is_none());
    }
}
