//! GET /health: upstream model health and loaded embedding spaces.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use bio_embedding::SpaceInfo;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// True when every probed profile is healthy.
    pub ok: bool,
    pub llm: Vec<HealthStatus>,
    pub embeddings: Vec<SpaceInfo>,
    /// `qdrant` or `memory`.
    pub store: &'static str,
}

/// Handler: GET /health
///
/// Answers `200` when all profiles are healthy and `503` otherwise; the body
/// is the same in both cases.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let llm = state.llm_profiles.health_all().await;
    let ok = llm.iter().all(|s| s.ok);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    ApiResponse::success(HealthResponse {
        ok,
        llm,
        embeddings: state.registry.describe(),
        store: state.store.backend(),
    })
    .with_status(status)
}
