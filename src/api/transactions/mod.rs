//! Transaction endpoints
//!
//! CRUD over the caller's own transactions plus the convenience reports that
//! live under `/transactions` (recent, search, summary, monthly, top
//! categories, daily), bulk import and cleanup of old records.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{double_option, ApiError, Json, Query};
use crate::domain::analytics::{
    end_of_day, start_of_day, FinancialSummary, MonthlyStatistics, TopCategory,
};
use crate::domain::category::{Category, CategoryId};
use crate::domain::group::GroupId;
use crate::domain::transaction::{
    SortField, SortOrder, Transaction, TransactionFilter, TransactionId, TransactionType,
};
use crate::domain::user::UserId;
use crate::infrastructure::transaction::{
    CreateTransactionRequest, ListTransactionsRequest, UpdateTransactionRequest,
    DEFAULT_CLEANUP_DAYS, DEFAULT_RECENT_LIMIT, DEFAULT_SEARCH_LIMIT,
};

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;
const DEFAULT_TOP_LIMIT: usize = 5;
const DEFAULT_TOP_PERIOD_DAYS: i64 = 30;

pub fn create_transactions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/recent", get(recent_transactions))
        .route("/search", get(search_transactions))
        .route("/summary", get(financial_summary))
        .route("/monthly", get(monthly_statistics))
        .route("/top-categories", get(top_categories))
        .route("/daily", get(daily_statistics))
        .route("/import", post(import_transactions))
        .route("/cleanup", delete(cleanup_transactions))
        .route(
            "/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// Request types

#[derive(Debug, Deserialize)]
pub struct CreateTransactionApiRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: i64,
    pub amount: f64,
    pub date: Option<DateTime<Utc>>,
    pub group_id: Option<i64>,
}

impl From<CreateTransactionApiRequest> for CreateTransactionRequest {
    fn from(req: CreateTransactionApiRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            category_id: CategoryId::new(req.category_id),
            amount: req.amount,
            date: req.date,
            group_id: req.group_id.map(GroupId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionApiRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category_id: Option<i64>,
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    /// `null` detaches the transaction from its group
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<i64>>,
}

impl From<UpdateTransactionApiRequest> for UpdateTransactionRequest {
    fn from(req: UpdateTransactionApiRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            category_id: req.category_id.map(CategoryId::new),
            amount: req.amount,
            date: req.date,
            group_id: req.group_id.map(|g| g.map(GroupId::new)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsParams {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
    pub category_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub group_id: Option<i64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(alias = "term")]
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TopCategoriesParams {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
    /// Look-back window in days; 0 or less covers all time
    pub period_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub days: Option<i64>,
}

// Response types

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: CategoryId,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub user_id: UserId,
    pub group_id: Option<GroupId>,
    pub category: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionResponse {
    pub fn new(tx: &Transaction, categories: &HashMap<CategoryId, Category>) -> Self {
        Self {
            id: tx.id(),
            name: tx.name().to_string(),
            kind: tx.kind(),
            category_id: tx.category_id(),
            amount: tx.amount(),
            date: tx.date(),
            user_id: tx.user_id(),
            group_id: tx.group_id(),
            category: categories.get(&tx.category_id()).map(|c| CategoryRef {
                id: c.id(),
                name: c.name().to_string(),
            }),
            created_at: tx.created_at(),
            updated_at: tx.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionResponse>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct DailyStatisticsResponse {
    pub date: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: usize,
    pub days: i64,
}

// Helpers

pub(crate) fn check_limit(
    limit: Option<usize>,
    default: usize,
    max: usize,
) -> Result<usize, ApiError> {
    let limit = limit.unwrap_or(default);
    if limit == 0 || limit > max {
        return Err(ApiError::unprocessable(format!(
            "limit must be between 1 and {}",
            max
        )));
    }
    Ok(limit)
}

/// Offsets past `i64::MAX` cannot be bound as a SQL OFFSET
pub(crate) fn check_skip(skip: usize) -> Result<usize, ApiError> {
    if i64::try_from(skip).is_err() {
        return Err(ApiError::unprocessable(format!(
            "skip must be between 0 and {}",
            i64::MAX
        )));
    }
    Ok(skip)
}

/// Render transactions with their category names resolved
pub(crate) async fn render(
    state: &AppState,
    transactions: &[Transaction],
) -> Result<Vec<TransactionResponse>, ApiError> {
    let categories = state.category_service.lookup().await?;
    Ok(transactions
        .iter()
        .map(|tx| TransactionResponse::new(tx, &categories))
        .collect())
}

async fn render_one(state: &AppState, tx: &Transaction) -> Result<TransactionResponse, ApiError> {
    let mut rendered = render(state, std::slice::from_ref(tx)).await?;
    rendered
        .pop()
        .ok_or_else(|| ApiError::internal("Internal server error"))
}

// Handlers

/// POST /transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateTransactionApiRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    debug!(user_id = %user.id(), "Creating transaction");

    let tx = state
        .transaction_service
        .create(user.id(), request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(render_one(&state, &tx).await?)))
}

/// GET /transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ListTransactionsParams>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let limit = check_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)?;
    let skip = check_skip(params.skip)?;

    let filter = TransactionFilter::default()
        .with_category(params.category_id.map(CategoryId::new))
        .with_kind(params.kind)
        .with_group(params.group_id.map(GroupId::new))
        .between(
            params.start_date.map(start_of_day),
            params.end_date.map(end_of_day),
        );

    let (items, total) = state
        .transaction_service
        .list(
            user.id(),
            ListTransactionsRequest {
                filter,
                sort_by: params.sort_by.unwrap_or_default(),
                order: params.sort_order.unwrap_or_default(),
                skip,
                limit,
            },
        )
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: render(&state, &items).await?,
        total,
        skip,
        limit,
    }))
}

/// GET /transactions/{id}
pub async fn get_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let tx = state
        .transaction_service
        .get(user.id(), TransactionId::new(id))
        .await?;

    Ok(Json(render_one(&state, &tx).await?))
}

/// PUT /transactions/{id}
pub async fn update_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTransactionApiRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    debug!(user_id = %user.id(), transaction_id = id, "Updating transaction");

    let tx = state
        .transaction_service
        .update(user.id(), TransactionId::new(id), request.into())
        .await?;

    Ok(Json(render_one(&state, &tx).await?))
}

/// DELETE /transactions/{id}
pub async fn delete_transaction(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .transaction_service
        .delete(user.id(), TransactionId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /transactions/recent
pub async fn recent_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let limit = check_limit(params.limit, DEFAULT_RECENT_LIMIT, 100)?;
    let items = state.transaction_service.recent(user.id(), limit).await?;

    Ok(Json(render(&state, &items).await?))
}

/// GET /transactions/search?q=
pub async fn search_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unprocessable("Search term 'q' is required"))?;
    let limit = check_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_PAGE_LIMIT)?;

    let items = state
        .transaction_service
        .search(user.id(), term, limit)
        .await?;

    Ok(Json(render(&state, &items).await?))
}

/// GET /transactions/summary
pub async fn financial_summary(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<FinancialSummary>, ApiError> {
    let summary = state
        .analytics_service
        .financial_summary(user.id(), params.start_date, params.end_date)
        .await?;

    Ok(Json(summary))
}

/// GET /transactions/monthly
pub async fn monthly_statistics(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<MonthlyParams>,
) -> Result<Json<Vec<MonthlyStatistics>>, ApiError> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let stats = state
        .analytics_service
        .monthly(user.id(), year, params.month)
        .await?;

    Ok(Json(stats))
}

/// GET /transactions/top-categories
pub async fn top_categories(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<TopCategoriesParams>,
) -> Result<Json<Vec<TopCategory>>, ApiError> {
    let limit = check_limit(params.limit, DEFAULT_TOP_LIMIT, 100)?;
    let top = state
        .analytics_service
        .top_categories(
            user.id(),
            params.kind.unwrap_or(TransactionType::Expense),
            limit,
            Some(params.period_days.unwrap_or(DEFAULT_TOP_PERIOD_DAYS)),
        )
        .await?;

    Ok(Json(top))
}

/// GET /transactions/daily
pub async fn daily_statistics(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<DailyParams>,
) -> Result<Json<DailyStatisticsResponse>, ApiError> {
    let stats = state.analytics_service.daily(user.id(), params.date).await?;

    Ok(Json(DailyStatisticsResponse {
        date: stats.date,
        total_income: stats.total_income,
        total_expense: stats.total_expense,
        balance: stats.balance,
        transaction_count: stats.transaction_count,
        transactions: render(&state, &stats.transactions).await?,
    }))
}

/// POST /transactions/import
///
/// Accepts a JSON array; items that fail to parse or validate are counted as failed.
pub async fn import_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(items): Json<Vec<Value>>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut requests = Vec::with_capacity(items.len());
    let mut malformed = 0;

    for item in items {
        match serde_json::from_value::<CreateTransactionApiRequest>(item) {
            Ok(request) => requests.push(request.into()),
            Err(e) => {
                warn!(user_id = %user.id(), error = %e, "Skipping malformed import item");
                malformed += 1;
            }
        }
    }

    let outcome = state.transaction_service.import(user.id(), requests).await;

    Ok(Json(ImportResponse {
        imported: outcome.imported,
        failed: outcome.failed + malformed,
    }))
}

/// DELETE /transactions/cleanup?days=
pub async fn cleanup_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_CLEANUP_DAYS);
    let deleted = state.transaction_service.cleanup(user.id(), days).await?;

    Ok(Json(CleanupResponse { deleted, days }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_limit_bounds() {
        assert_eq!(check_limit(None, 100, 1000).unwrap(), 100);
        assert_eq!(check_limit(Some(1000), 100, 1000).unwrap(), 1000);
        assert!(check_limit(Some(0), 100, 1000).is_err());
        assert!(check_limit(Some(1001), 100, 1000).is_err());
    }

    #[test]
    fn test_check_skip_bounds() {
        assert_eq!(check_skip(0).unwrap(), 0);
        assert_eq!(check_skip(i64::MAX as usize).unwrap(), i64::MAX as usize);

        let err = check_skip(usize::MAX).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_update_request_distinguishes_null_group() {
        let detach: UpdateTransactionApiRequest =
            serde_json::from_str(r#"{"group_id":null}"#).unwrap();
        let untouched: UpdateTransactionApiRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(UpdateTransactionRequest::from(detach).group_id, Some(None));
        assert_eq!(UpdateTransactionRequest::from(untouched).group_id, None);
    }

    #[test]
    fn test_create_request_uses_type_key() {
        let req: CreateTransactionApiRequest = serde_json::from_str(
            r#"{"name":"Lunch","type":"expense","category_id":3,"amount":12.5}"#,
        )
        .unwrap();

        let req = CreateTransactionRequest::from(req);
        assert_eq!(req.kind, TransactionType::Expense);
        assert_eq!(req.category_id, CategoryId::new(3));
        assert!(req.date.is_none());
    }
}
