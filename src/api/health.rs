//! Service info and health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

const SERVICE_NAME: &str = "spending-tracker-api";

/// Top-level resource prefixes advertised by `GET /`
const ENDPOINTS: [&str; 6] = [
    "/auth",
    "/transactions",
    "/categories",
    "/groups",
    "/analytics",
    "/users",
];

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub docs: Option<String>,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub database: String,
}

/// Health response with optional component checks
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to Spending Tracker API".to_string(),
        version: version(),
        status: "operational".to_string(),
        docs: None,
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

pub async fn version_info(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: version(),
        is_async: true,
        database: state.storage_backend.as_str().to_string(),
    })
}

/// Simple health check - 200 while the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        service: SERVICE_NAME.to_string(),
        version: version(),
        database: "connected".to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check; verifies the database answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let database = check_database(&state).await;
    let status = database.status;

    let response = HealthResponse {
        status,
        service: SERVICE_NAME.to_string(),
        version: version(),
        database: match status {
            HealthStatus::Healthy => "connected".to_string(),
            HealthStatus::Unhealthy => "disconnected".to_string(),
        },
        checks: Some(vec![database]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_database(state: &AppState) -> HealthCheck {
    let start = Instant::now();
    let (status, message) = match state.database_status().await {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => (HealthStatus::Unhealthy, Some(e)),
    };

    HealthCheck {
        name: format!("database:{}", state.storage_backend.as_str()),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            service: SERVICE_NAME.to_string(),
            version: "1.0.0".to_string(),
            database: "connected".to_string(),
            checks: None,
            latency_ms: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "spending-tracker-api");
        assert!(json.get("checks").is_none());
    }

    #[test]
    fn test_version_uses_async_key() {
        let json = serde_json::to_value(VersionResponse {
            version: "1.0.0".to_string(),
            is_async: true,
            database: "memory".to_string(),
        })
        .unwrap();

        assert_eq!(json["async"], true);
        assert_eq!(json["database"], "memory");
    }
}
