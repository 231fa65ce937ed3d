//! Uniform JSON envelope returned by every API route except the download stream.
//!
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "message": ["User id is required.", "At least one file is required."] }
//! { "success": false, "message": ["Internal server error"], "path": "/api/upload" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Successful result carrying a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessEnvelope<T> {
    /// Always `true`
    pub success: bool,
    pub data: T,
}

/// Failed result. `path` is only present for unexpected errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FailureEnvelope {
    /// Always `false`
    pub success: bool,
    /// Human-readable messages, in the order the problems were found
    pub message: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

pub fn api_success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(SuccessEnvelope { success: true, data })).into_response()
}

pub fn api_created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(SuccessEnvelope { success: true, data })).into_response()
}

/// Expected failure with one or more messages. Non-error statuses fall back to 400.
pub fn api_failure(messages: Vec<String>, status: StatusCode) -> Response {
    let status = if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::BAD_REQUEST
    };

    (
        status,
        Json(FailureEnvelope {
            success: false,
            message: messages,
            path: None,
        }),
    )
        .into_response()
}

/// Unexpected failure, always 500.
pub fn api_error(message: impl Into<String>, path: Option<&str>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureEnvelope {
            success: false,
            message: vec![message.into()],
            path: path.map(str::to_owned),
        }),
    )
        .into_response()
}
