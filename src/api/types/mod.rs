//! Shared API types: error body and JSON-reporting extractors

pub mod error;
pub mod json;
pub mod patch;
pub mod query;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use patch::double_option;
pub use query::Query;

use serde::Serialize;

/// `{"message": "..."}` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
