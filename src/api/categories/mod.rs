//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{double_option, ApiError, Json};
use crate::domain::category::{Category, CategoryId};
use crate::domain::transaction::TransactionType;
use crate::infrastructure::category::{CreateCategoryRequest, UpdateCategoryRequest};

pub fn create_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryApiRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl From<CreateCategoryApiRequest> for CreateCategoryRequest {
    fn from(req: CreateCategoryApiRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            kind: req.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryApiRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

impl From<UpdateCategoryApiRequest> for UpdateCategoryRequest {
    fn from(req: UpdateCategoryApiRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            kind: req.kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id(),
            name: category.name().to_string(),
            description: category.description().map(str::to_string),
            kind: category.kind(),
            created_at: category.created_at(),
        }
    }
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateCategoryApiRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    debug!(user_id = %user.id(), name = %request.name, "Creating category");

    let category = state.category_service.create(request.into()).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.category_service.list().await?;

    Ok(Json(categories.iter().map(CategoryResponse::from).collect()))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state.category_service.get(CategoryId::new(id)).await?;

    Ok(Json(CategoryResponse::from(&category)))
}

/// PUT /categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCategoryApiRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    debug!(user_id = %user.id(), category_id = id, "Updating category");

    let category = state
        .category_service
        .update(CategoryId::new(id), request.into())
        .await?;

    Ok(Json(CategoryResponse::from(&category)))
}

/// DELETE /categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user.id(), category_id = id, "Deleting category");

    state.category_service.delete(CategoryId::new(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
