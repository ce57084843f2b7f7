//! JSON envelope of every BioRAG endpoint.
//!
//! ```json
//! { "success": true,  "data": { "answer": "...", "mode": "clinical" } }
//! { "success": false, "error": { "code": "INVALID_MODE", "message": "...",
//!   "details": [{ "path": "mode", "allowed": ["clinical", "moa", "protein", "regulatory"] }] } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize)]
pub struct ApiError {
    /// `INVALID_MODE`, `UPSTREAM_LLM_ERROR`, `STORE_ERROR`, ...
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// What to change in the request.
#[derive(Serialize, Default)]
pub struct ApiErrorDetail {
    /// Request field at fault, e.g. `mode` or `path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Closed set of accepted values for `path`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<&'static str>,
}

impl ApiErrorDetail {
    pub fn field(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn hint(hint: impl Into<String>) -> Self {
        Self {
            hint: Some(hint.into()),
            ..Self::default()
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = &'static str>) -> Self {
        self.allowed = allowed.into_iter().collect();
        self
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &'static str, message: impl Into<String>, details: Vec<ApiErrorDetail>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
                details,
            }),
        }
    }
}

/// `200 OK` with a success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    ApiResponse::success(data).with_status(StatusCode::OK)
}
