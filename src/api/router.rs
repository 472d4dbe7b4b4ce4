use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::middleware::{
    logging_middleware, metrics_middleware, security_headers_middleware, MAX_BODY_SIZE,
};
use super::state::AppState;
use super::{analytics, auth, categories, groups, health, transactions, users};
use crate::config::CorsConfig;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Routes grouped by resource, before state is attached
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/version", get(health::version_info))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/auth", auth::create_auth_router())
        .nest("/users", users::create_users_router())
        .nest("/categories", categories::create_categories_router())
        .nest("/transactions", transactions::create_transactions_router())
        .nest("/groups", groups::create_groups_router())
        .nest("/analytics", analytics::create_analytics_router())
}

/// Create the full router with application state, middleware and optional metrics endpoint
pub fn create_router_with_state(
    state: AppState,
    cors: &CorsConfig,
    metrics: Option<PrometheusMetrics>,
) -> Router {
    let mut router = api_routes()
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors_layer(cors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
