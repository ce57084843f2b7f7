//! POST /v1/chat/completions: mode-aware RAG chat.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, response::Response};
use bio_contextor::ChatOptions;
use bio_metadata::Mode;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ok},
    error_handler::AppResult,
    routes::chat::chat_request::{ChatCompletionRequest, ChatCompletionResponse},
};

/// Handler: POST /v1/chat/completions
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:7860/v1/chat/completions \
///   -H 'content-type: application/json' \
///   -d '{"messages":[{"role":"user","content":"What is the dose?"}],"mode":"clinical"}'
/// ```
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let mode = Mode::parse_opt(body.mode.as_deref())?;

    let opts = ChatOptions {
        use_context: body.use_context.unwrap_or(true),
        top_k: body.top_k,
    };
    debug!(
        mode = ?mode,
        turns = body.messages.len(),
        use_context = opts.use_context,
        "chat_completions: start"
    );

    let answer = state.chat.chat(&body.messages, mode, &opts).await?;

    let include_sources = body.include_sources.unwrap_or(false);
    Ok(ok(ChatCompletionResponse {
        answer: answer.answer,
        mode: answer.mode,
        sources: include_sources.then_some(answer.sources),
    }))
}
