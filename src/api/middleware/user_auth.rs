//! User authentication using bearer access tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;
use crate::infrastructure::auth::TokenKind;

pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Extractor that requires a valid access token in `Authorization: Bearer <token>`
/// and resolves it to an active user.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        debug!("Validating access token");

        let claims = state
            .jwt_service
            .validate(&token, TokenKind::Access)
            .map_err(|_| ApiError::unauthorized(INVALID_CREDENTIALS))?;
        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        let user = state
            .user_service
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        if !user.is_active() {
            return Err(ApiError::bad_request("Inactive user"));
        }

        Ok(RequireUser(user))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))
}
