//! Authentication API endpoints
//!
//! Registration, login with access/refresh tokens, token refresh, and password
//! changes. Tokens are stateless, so logout is handled by the client discarding
//! them.

use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::middleware::user_auth::INVALID_CREDENTIALS;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse};
use crate::api::users::UserResponse;
use crate::domain::user::User;
use crate::infrastructure::auth::TokenKind;
use crate::infrastructure::observability::record_event;
use crate::infrastructure::user::{ChangePasswordRequest, RegisterUserRequest};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
        .route("/change-password", post(change_password))
}

#[derive(Debug, Deserialize)]
pub struct RegisterApiRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterApiRequest> for RegisterUserRequest {
    fn from(req: RegisterApiRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Accepts `username` as an alias so OAuth2-style clients keep working
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// Login credentials from a JSON body or an OAuth2 password form
/// (`application/x-www-form-urlencoded` with `username`/`password`)
#[derive(Debug)]
pub struct Credentials(pub LoginRequest);

impl<S> FromRequest<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(login) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    ApiError::unprocessable(format!(
                        "Invalid form data: {}",
                        rejection.body_text()
                    ))
                })?;
            return Ok(Self(login));
        }

        let Json(login) = Json::<LoginRequest>::from_request(req, state).await?;
        Ok(Self(login))
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordApiRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

fn issue_tokens(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    Ok(TokenResponse {
        access_token: state.jwt_service.generate(user, TokenKind::Access)?,
        refresh_token: state.jwt_service.generate(user, TokenKind::Refresh)?,
        token_type: "bearer".to_string(),
        expires_in: state.jwt_service.access_token_ttl_secs(),
    })
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterApiRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(email = %request.email, "Registering user");

    let user = state.user_service.register(request.into()).await?;
    record_event("user_registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Credentials(request): Credentials,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    record_event("user_logged_in");
    info!(user_id = %user.id(), "User logged in");
    Ok(Json(issue_tokens(&state, &user)?))
}

/// POST /auth/refresh
///
/// Exchanges a refresh token for a new token pair.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = state
        .jwt_service
        .validate(&request.refresh_token, TokenKind::Refresh)
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

    Ok(Json(issue_tokens(&state, &user)?))
}

/// POST /auth/logout
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Successfully logged out"))
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ChangePasswordApiRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .user_service
        .change_password(
            user.id(),
            ChangePasswordRequest {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_username_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"a@b.io","password":"pw1234"}"#).unwrap();
        assert_eq!(req.email, "a@b.io");
    }

    fn login_request(content_type: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, content_type)
            .body(axum::body::Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_credentials_from_oauth2_form() {
        let req = login_request(
            "application/x-www-form-urlencoded",
            "username=a%40b.io&password=pw1234",
        );

        let Credentials(login) = Credentials::from_request(req, &()).await.unwrap();
        assert_eq!(login.email, "a@b.io");
        assert_eq!(login.password, "pw1234");
    }

    #[tokio::test]
    async fn test_credentials_from_json() {
        let req = login_request(
            "application/json",
            r#"{"email":"a@b.io","password":"pw1234"}"#,
        );

        let Credentials(login) = Credentials::from_request(req, &()).await.unwrap();
        assert_eq!(login.email, "a@b.io");
    }

    #[tokio::test]
    async fn test_credentials_form_missing_password() {
        let req = login_request("application/x-www-form-urlencoded", "username=a%40b.io");

        let err = Credentials::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_token_response_shape() {
        let json = serde_json::to_value(TokenResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
            expires_in: 1800,
        })
        .unwrap();

        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 1800);
    }
}
