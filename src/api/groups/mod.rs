//! Group endpoints: membership management and shared reports

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::transactions::{check_limit, check_skip, render, TransactionListResponse};
use crate::api::types::{double_option, ApiError, Json, Query};
use crate::domain::analytics::{GroupAnalytics, GroupSummary};
use crate::domain::group::{Group, GroupId};
use crate::domain::user::{User, UserId};
use crate::infrastructure::group::{CreateGroupRequest, UpdateGroupRequest};

const DEFAULT_GROUP_LIMIT: usize = 100;
const MAX_GROUP_LIMIT: usize = 100;

pub fn create_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route(
            "/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/{id}/analytics", get(group_analytics))
        .route("/{id}/summary", get(group_summary))
        .route("/{id}/transactions", get(group_transactions))
        .route("/{id}/members", post(add_member))
        .route("/{id}/members/{user_id}", delete(remove_member))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupApiRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupApiRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GroupAnalyticsParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id(),
            name: group.name().to_string(),
            description: group.description().map(str::to_string),
            owner_id: group.owner_id(),
            member_count: group.member_count(),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for MemberResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupWithMembersResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub members: Vec<MemberResponse>,
}

async fn with_members(
    state: &AppState,
    group: &Group,
) -> Result<GroupWithMembersResponse, ApiError> {
    let members = state.group_service.members(group).await?;

    Ok(GroupWithMembersResponse {
        group: GroupResponse::from(group),
        members: members.iter().map(MemberResponse::from).collect(),
    })
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateGroupApiRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    debug!(user_id = %user.id(), name = %request.name, "Creating group");

    let group = state
        .group_service
        .create(
            user.id(),
            CreateGroupRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(&group))))
}

/// GET /groups
pub async fn list_groups(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let limit = check_limit(params.limit, DEFAULT_GROUP_LIMIT, MAX_GROUP_LIMIT)?;
    let skip = check_skip(params.skip)?;
    let groups = state
        .group_service
        .list(user.id(), skip, limit)
        .await?;

    Ok(Json(groups.iter().map(GroupResponse::from).collect()))
}

/// GET /groups/{id}
pub async fn get_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<GroupWithMembersResponse>, ApiError> {
    let group = state.group_service.get(user.id(), GroupId::new(id)).await?;

    Ok(Json(with_members(&state, &group).await?))
}

/// PUT /groups/{id}
pub async fn update_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateGroupApiRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = state
        .group_service
        .update(
            user.id(),
            GroupId::new(id),
            UpdateGroupRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok(Json(GroupResponse::from(&group)))
}

/// DELETE /groups/{id}
pub async fn delete_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .group_service
        .delete(user.id(), GroupId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /groups/{id}/analytics
pub async fn group_analytics(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Query(params): Query<GroupAnalyticsParams>,
) -> Result<Json<GroupAnalytics>, ApiError> {
    let report = state
        .analytics_service
        .group_analytics(
            user.id(),
            GroupId::new(id),
            params.start_date,
            params.end_date,
            params.category.as_deref(),
        )
        .await?;

    Ok(Json(report))
}

/// GET /groups/{id}/summary
pub async fn group_summary(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<GroupSummary>, ApiError> {
    let summary = state
        .analytics_service
        .group_summary(user.id(), GroupId::new(id))
        .await?;

    Ok(Json(summary))
}

/// GET /groups/{id}/transactions
pub async fn group_transactions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let limit = check_limit(params.limit, DEFAULT_GROUP_LIMIT, 1000)?;
    let skip = check_skip(params.skip)?;
    let (items, total) = state
        .group_service
        .transactions(user.id(), GroupId::new(id), skip, limit)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: render(&state, &items).await?,
        total,
        skip,
        limit,
    }))
}

/// POST /groups/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<GroupWithMembersResponse>, ApiError> {
    let group = state
        .group_service
        .add_member(user.id(), GroupId::new(id), &request.email)
        .await?;

    Ok(Json(with_members(&state, &group).await?))
}

/// DELETE /groups/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((id, member_id)): Path<(i64, i64)>,
) -> Result<Json<GroupWithMembersResponse>, ApiError> {
    let group = state
        .group_service
        .remove_member(user.id(), GroupId::new(id), UserId::new(member_id))
        .await?;

    Ok(Json(with_members(&state, &group).await?))
}
