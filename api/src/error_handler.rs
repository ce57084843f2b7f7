use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bio_contextor::ContextorError;
use bio_embedding::EmbeddingError;
use bio_ingest::{BaseIngestionError, IngestError};
use bio_metadata::{ALLOWED_MODES, Mode, ModeError};
use thiserror::Error;
use tracing::error;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid API_ADDRESS '{0}'")]
    InvalidAddress(String),

    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    InvalidMode(#[from] ModeError),

    /// `path` outside the ingest root, missing, or path ingestion disabled.
    #[error("path rejected: {0}")]
    UnsafePath(String),

    // --- Lower layers ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) | AppError::InvalidMode(_) | AppError::UnsafePath(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Ingest(IngestError::Base(_)) => StatusCode::BAD_REQUEST,

            // upstream model runtime
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Embedding(EmbeddingError::Llm(_))
            | AppError::Ingest(IngestError::Embedding(EmbeddingError::Llm(_))) => {
                StatusCode::BAD_GATEWAY
            }

            // 5xx
            AppError::InvalidAddress(_)
            | AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Embedding(_)
            | AppError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidAddress(_) | AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidMode(_) => "INVALID_MODE",
            AppError::UnsafePath(_) => "INVALID_PATH",
            AppError::Llm(_) => "UPSTREAM_LLM_ERROR",
            AppError::Embedding(EmbeddingError::Llm(_)) => "UPSTREAM_LLM_ERROR",
            AppError::Embedding(_) => "EMBEDDING_ERROR",
            AppError::Ingest(IngestError::Base(BaseIngestionError::Io { .. })) => "FILE_READ_ERROR",
            AppError::Ingest(IngestError::Base(_)) => "INGEST_INPUT_ERROR",
            AppError::Ingest(IngestError::Embedding(EmbeddingError::Llm(_))) => {
                "UPSTREAM_LLM_ERROR"
            }
            AppError::Ingest(IngestError::Embedding(_)) => "EMBEDDING_ERROR",
            AppError::Ingest(IngestError::Store(_)) => "STORE_ERROR",
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::InvalidMode(_) => vec![
                ApiErrorDetail::field("mode")
                    .with_hint(format!("Use one of: {ALLOWED_MODES}."))
                    .with_allowed(Mode::ALL.map(Mode::as_str)),
            ],
            AppError::UnsafePath(_) => vec![
                ApiErrorDetail::field("path")
                    .with_hint("Name a file under INGEST_ROOT, or send the content as `text`."),
            ],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            error!(code = self.error_code(), error = %self, "request failed");
        }
        ApiResponse::failure(self.error_code(), self.to_string(), self.details())
            .with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert JSON body rejections to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Convert contextor failures, keeping mode and upstream errors distinct.
impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::EmptyConversation => AppError::BadRequest(err.to_string()),
            ContextorError::InvalidMode(e) => AppError::InvalidMode(e),
            ContextorError::Embedding(e) => AppError::Embedding(e),
            ContextorError::Store(e) => AppError::Ingest(IngestError::Store(e)),
            ContextorError::Llm(e) => AppError::Llm(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_error_maps_to_invalid_mode() {
        let err: AppError = "oncology".parse::<bio_metadata::Mode>().unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_MODE");
        assert!(err.to_string().contains(ALLOWED_MODES));
    }

    #[test]
    fn contextor_errors_are_split_by_cause() {
        let empty: AppError = ContextorError::EmptyConversation.into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let upstream: AppError =
            ContextorError::Llm(AiLlmError::Timeout(std::time::Duration::from_secs(1))).into();
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.error_code(), "UPSTREAM_LLM_ERROR");
    }

    #[test]
    fn retrieval_failure_is_a_store_error() {
        let err: AppError =
            ContextorError::Store(bio_ingest::StoreError::Qdrant("connection refused".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "STORE_ERROR");
    }

    #[test]
    fn rejected_path_points_at_the_field() {
        let err = AppError::UnsafePath("outside the ingest root".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PATH");
        assert_eq!(err.details()[0].path.as_deref(), Some("path"));
    }

    #[test]
    fn invalid_ingest_input_is_a_client_error() {
        let err: AppError =
            IngestError::Base(BaseIngestionError::InvalidInput("empty file name".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INGEST_INPUT_ERROR");
    }
}
