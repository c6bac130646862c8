//! Response envelopes

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Uniform API envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// `{ "result": .. }` or `{ "error": .. }` with the error's status class
pub fn tool_reply(result: inkwell_tools::Result<serde_json::Value>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(serde_json::json!({ "result": value }))).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// `{ "error": .. }` for a request body that failed to parse
pub fn tool_rejection(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(serde_json::json!({ "error": rejection.body_text() })),
    )
        .into_response()
}
