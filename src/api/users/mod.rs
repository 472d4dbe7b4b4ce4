//! Current user profile endpoints

use axum::{extract::State, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::infrastructure::user::UpdateProfileRequest;

pub fn create_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile).patch(update_profile))
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub full_name: String,
    pub groups_count: usize,
    pub owned_groups_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileApiRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateProfileApiRequest> for UpdateProfileRequest {
    fn from(req: UpdateProfileApiRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        }
    }
}

async fn profile_of(state: &AppState, user: &User) -> Result<UserProfileResponse, ApiError> {
    let (groups_count, owned_groups_count) = state.group_service.counts_for(user.id()).await?;

    Ok(UserProfileResponse {
        user: UserResponse::from(user),
        full_name: user.full_name(),
        groups_count,
        owned_groups_count,
    })
}

/// GET /users/me
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<UserProfileResponse>, ApiError> {
    Ok(Json(profile_of(&state, &user).await?))
}

/// PATCH /users/me
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<UpdateProfileApiRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    debug!(user_id = %user.id(), "Updating profile");

    let updated = state
        .user_service
        .update_profile(user.id(), request.into())
        .await?;

    Ok(Json(profile_of(&state, &updated).await?))
}
