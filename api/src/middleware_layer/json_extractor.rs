//! Response middleware: request ids and JSON envelopes for bare client errors.
//!
//! Handlers already answer with [`ApiResponse`]; axum's own rejections
//! (unknown route, wrong method, missing content type) come back as plain
//! text. Those are rewritten into the error envelope here.

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn request_id(headers: &HeaderMap) -> String {
    if let Some(v) = headers.get(REQUEST_ID_HEADER).and_then(|h| h.to_str().ok()) {
        if !v.trim().is_empty() {
            return v.to_string();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn client_error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "CLIENT_ERROR",
    }
}

fn hint_for(message: &str) -> Option<String> {
    if message.contains("Content-Type") {
        Some("Send the body with `Content-Type: application/json`.".into())
    } else if message.contains("expected a sequence") {
        Some("Expected an array for this field.".into())
    } else if message.contains("unknown variant") {
        Some("Roles are `system`, `user` or `assistant`.".into())
    } else {
        None
    }
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let req_id = request_id(req.headers());
    let res = next.run(req).await;
    let status = res.status();

    let mut res = if status.is_client_error() && !is_json(res.headers()) {
        let (mut parts, bytes) = take_body(res).await;
        let original = String::from_utf8_lossy(&bytes);
        let message = match original.trim() {
            "" => status.canonical_reason().unwrap_or("client error").to_string(),
            m => m.to_string(),
        };
        let hint = hint_for(&message);
        let details = hint.map(ApiErrorDetail::hint).into_iter().collect();

        let envelope = ApiResponse::failure(client_error_code(status), message, details);
        let body = match serde_json::to_vec(&envelope) {
            Ok(v) => v,
            Err(_) => bytes.to_vec(),
        };

        parts.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(body))
    } else {
        res
    };

    if let Ok(v) = HeaderValue::from_str(&req_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    res
}
