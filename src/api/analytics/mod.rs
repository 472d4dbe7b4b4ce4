//! Analytics endpoints and report export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query};
use crate::domain::analytics::{CategorySummary, Granularity, Overview, PeriodSummary};
use crate::domain::category::CategoryId;
use crate::domain::export::ExportFormat;
use crate::domain::group::GroupId;
use crate::infrastructure::analytics::ExportFilter;
use crate::infrastructure::export::exporter_for;
use crate::infrastructure::observability::record_event;

pub fn create_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/by-category", get(by_category))
        .route("/by-date", get(by_date))
        .route("/export", get(export_report))
}

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ByDateParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub group_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub group_id: Option<i64>,
    pub format: Option<String>,
}

/// GET /analytics/overview
pub async fn overview(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<PeriodParams>,
) -> Result<Json<Overview>, ApiError> {
    let report = state
        .analytics_service
        .overview(user.id(), params.start_date, params.end_date)
        .await?;

    Ok(Json(report))
}

/// GET /analytics/by-category
pub async fn by_category(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<PeriodParams>,
) -> Result<Json<Vec<CategorySummary>>, ApiError> {
    let report = state
        .analytics_service
        .by_category(user.id(), params.start_date, params.end_date)
        .await?;

    Ok(Json(report))
}

/// GET /analytics/by-date?group_by=day|week|month
pub async fn by_date(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ByDateParams>,
) -> Result<Json<Vec<PeriodSummary>>, ApiError> {
    let granularity = match params.group_by.as_deref() {
        Some(value) => value.parse::<Granularity>()?,
        None => Granularity::default(),
    };

    let report = state
        .analytics_service
        .by_date(user.id(), params.start_date, params.end_date, granularity)
        .await?;

    Ok(Json(report))
}

/// GET /analytics/export?format=csv|xlsx
pub async fn export_report(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let format = match params.format.as_deref() {
        Some(value) => value.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };
    debug!(user_id = %user.id(), ?format, "Exporting report");

    let rows = state
        .analytics_service
        .export_rows(
            user.id(),
            ExportFilter {
                start_date: params.start_date,
                end_date: params.end_date,
                category_id: params.category_id.map(CategoryId::new),
                group_id: params.group_id.map(GroupId::new),
            },
        )
        .await?;

    let exporter = exporter_for(format);
    let body = exporter.export(&rows)?;

    record_event("report_exported");
    info!(user_id = %user.id(), rows = rows.len(), ?format, "Report exported");

    Ok((
        [
            (header::CONTENT_TYPE, exporter.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", exporter.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}
