//! POST /v1/ingest/{mode}: domain ingestion of one file.

use std::{
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use bio_ingest::FileData;
use bio_metadata::Mode;
use tracing::{info, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ok},
    error_handler::{AppError, AppResult},
    routes::ingest::ingest_request::{IngestRequest, IngestResponse, IngestedDocument},
};

const PREVIEW_CHARS: usize = 200;

/// Handler: POST /v1/ingest/{mode}
///
/// `path` is resolved against `INGEST_ROOT` and must stay inside it; without
/// a configured root only `text` is accepted.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:7860/v1/ingest/clinical \
///   -H 'content-type: application/json' \
///   -d '{"file_name":"trial.txt","text":"Inclusion criteria: adults 18-65."}'
/// ```
pub async fn ingest_file(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> AppResult<Response> {
    let mode: Mode = mode.parse()?;
    let Json(body) = payload?;

    let data = match (body.text, body.path) {
        (Some(text), None) => FileData::Bytes(text.into_bytes()),
        (None, Some(path)) => {
            FileData::Path(confine_path(state.ingest_root.as_deref(), &path).await?)
        }
        _ => {
            return Err(AppError::BadRequest(
                "exactly one of `text` or `path` must be provided".into(),
            ));
        }
    };

    let saved = state.ingest.ingest(mode, &body.file_name, &data).await?;
    info!(mode = %mode, file = %body.file_name, chunks = saved.len(), "file ingested");

    let documents = saved
        .iter()
        .map(|d| IngestedDocument {
            id: d.id.clone(),
            metadata: d.metadata.clone(),
            preview: d.text.chars().take(PREVIEW_CHARS).collect(),
        })
        .collect();

    Ok(ok(IngestResponse {
        mode,
        file_name: body.file_name,
        documents,
    }))
}

/// Resolves `requested` under `root` (relative paths are taken from `root`)
/// and rejects anything that ends up outside it after `..` and symlinks are
/// resolved. `root` must already be canonical.
pub(crate) async fn confine_path(root: Option<&FsPath>, requested: &FsPath) -> AppResult<PathBuf> {
    let Some(root) = root else {
        return Err(AppError::UnsafePath(
            "path ingestion is disabled on this server".into(),
        ));
    };

    // Same message for missing and foreign files.
    let rejected = || AppError::UnsafePath("no such file under the ingest root".into());

    let resolved = tokio::fs::canonicalize(root.join(requested))
        .await
        .map_err(|_| rejected())?;
    if !resolved.starts_with(root) {
        warn!(requested = %requested.display(), "path outside the ingest root rejected");
        return Err(rejected());
    }
    Ok(resolved)
}
