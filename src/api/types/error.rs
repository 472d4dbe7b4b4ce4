//! API error type and JSON error body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    PermissionError,
    NotFoundError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::PermissionError => write!(f, "permission_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body: `{"detail": "...", "type": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
                error_type,
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorType::InvalidRequestError,
            detail,
        )
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, detail)
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, detail)
    }

    pub fn detail(&self) -> &str {
        &self.response.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Conflict { message } => Self::bad_request(message),
            DomainError::Unauthorized { message } => Self::unauthorized(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => {
                error!(error = %err, "Request failed with internal error");
                Self::internal("Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.error_type, self.response.detail)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Category not found");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.detail(), "Category not found");
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("x"), StatusCode::BAD_REQUEST),
            (DomainError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            assert_eq!(ApiError::from(domain_err).status, status);
        }
    }

    #[test]
    fn test_storage_detail_not_leaked() {
        let err: ApiError = DomainError::storage("connection refused at 10.0.0.3").into();
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("Could not validate credentials");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["detail"], "Could not validate credentials");
        assert_eq!(json["type"], "authentication_error");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::unauthorized("nope").into_response();
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }
}
