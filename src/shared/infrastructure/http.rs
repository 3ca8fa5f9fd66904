use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};

/// Body of every error answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
    pub error_message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            error_message: error_message.into(),
        }
    }
}

pub fn respond_with_error(
    status: StatusCode,
    error_code: &str,
    error_message: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error_code, error_message))).into_response()
}
