//! `{data, errors, meta}` response envelope.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// Every JSON response uses this shape; absent parts are omitted.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// 200 with `{data}`.
pub fn json_ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: Some(data),
            errors: None,
            meta: None,
        }),
    )
}

/// 201 with `{data}`.
pub fn json_created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            data: Some(data),
            errors: None,
            meta: None,
        }),
    )
}

/// Error response with a single `{"error": msg}` entry.
pub fn json_error_msg(status: StatusCode, msg: &str) -> axum::response::Response {
    let body = Json(json!({ "errors": { "error": msg } }));
    (status, body).into_response()
}

/// 200 `{data: {message}}` convenience used by the write endpoints.
pub fn json_message(msg: &str) -> impl IntoResponse {
    json_ok(json!({ "message": msg }))
}
