//! HTTP surface of the BioRAG backend.
//!
//! - `POST /v1/chat/completions`: RAG chat with an optional biotech `mode`
//! - `POST /v1/ingest/{mode}`: domain ingestion of one file
//! - `GET  /health`: model runtime health and loaded embedding spaces

use std::{env, net::SocketAddr, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{
    chat::chat_route::chat_completions, health::health_route::health,
    ingest::ingest_route::ingest_file,
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:7860";

/// Builds the application router over an initialized state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/ingest/{mode}", post(ingest_file))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Loads every model, then serves until Ctrl+C.
///
/// Model loading happens before the listener binds; a model that fails to
/// load aborts startup with the loader's error.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());
    let addr: SocketAddr = host_url
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidAddress(host_url.clone()))?;

    let state = Arc::new(AppState::bootstrap().await?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "BioRAG API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("BioRAG API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        time::{Duration, SystemTime, UNIX_EPOCH},
    };

    use ai_llm_service::{
        AiLlmError, ChatMessage, LlmModelConfig, LlmProvider, LlmServiceProfiles, MessageRole,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use bio_contextor::{
        CLINICAL_TEMPLATE, ChatBackend, ChatFuture, ChatService, ContextorConfig,
        DEFAULT_TEMPLATE,
    };
    use bio_embedding::{BioBackend, BioEmbedding, EmbeddingRegistry, HashEmbedder};
    use bio_ingest::{IngestComponent, MemoryStore, PlainTextIngestion, VectorStore};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const CLINICAL_TEXT: &str =
        "Eligibility criteria: Patients aged 18-65. Dose: 100mg daily. Adverse events: nausea.";

    /// Answers with the system prompt it received.
    struct EchoSystemPrompt;

    impl ChatBackend for EchoSystemPrompt {
        fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
            Box::pin(async move {
                Ok(messages
                    .iter()
                    .find(|m| m.role == MessageRole::System)
                    .map(|m| m.content.clone())
                    .unwrap_or_default())
            })
        }
    }

    struct Unreachable;

    impl ChatBackend for Unreachable {
        fn complete<'a>(&'a self, _messages: &'a [ChatMessage]) -> ChatFuture<'a> {
            Box::pin(async { Err(AiLlmError::Timeout(Duration::from_secs(1))) })
        }
    }

    fn offline(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    fn app(backend: Arc<dyn ChatBackend>) -> Router {
        app_with_root(backend, None)
    }

    fn app_with_root(backend: Arc<dyn ChatBackend>, ingest_root: Option<PathBuf>) -> Router {
        let llm_profiles = Arc::new(
            LlmServiceProfiles::new(offline("llama3.1:8b"), offline("nomic-embed-text"), Some(1))
                .unwrap(),
        );
        let bio = BioEmbedding::from_provider(
            Arc::new(HashEmbedder::new("biobert", 96)),
            BioBackend::Ollama,
        );
        let registry = EmbeddingRegistry::new(
            Arc::new(HashEmbedder::new("general", 64)),
            Some(Arc::new(bio)),
        );
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
        let ingest = IngestComponent::new(
            Arc::new(PlainTextIngestion::default()),
            registry.clone(),
            store.clone(),
        );
        let chat = ChatService::new(
            backend,
            registry.clone(),
            store.clone(),
            ContextorConfig::default(),
        );

        router(Arc::new(AppState {
            llm_profiles,
            registry,
            store,
            ingest,
            chat,
            ingest_root,
        }))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn ingest_clinical(app: &Router) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/v1/ingest/clinical",
            Some(json!({ "file_name": "trial.txt", "text": CLINICAL_TEXT })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    #[tokio::test]
    async fn ingest_attaches_domain_metadata() {
        let app = app(Arc::new(EchoSystemPrompt));
        let body = ingest_clinical(&app).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["mode"], "clinical");
        let md = &body["data"]["documents"][0]["metadata"];
        assert_eq!(md["document_type"], "clinical");
        assert_eq!(md["file_name"], "trial.txt");
        assert_eq!(md["dose_schema"], "100mg daily");
        assert!(md.get("regulatory_section").is_none());
    }

    #[tokio::test]
    async fn clinical_chat_uses_clinical_template() {
        let app = app(Arc::new(EchoSystemPrompt));
        ingest_clinical(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/v1/chat/completions",
            Some(json!({
                "messages": [{ "role": "user", "content": "What is the dose?" }],
                "mode": "clinical",
                "include_sources": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["answer"], CLINICAL_TEMPLATE.system_prompt);
        assert_eq!(body["data"]["mode"], "clinical");
        assert_eq!(body["data"]["sources"][0]["document_type"], "clinical");
    }

    #[tokio::test]
    async fn chat_without_mode_keeps_default_behavior() {
        let app = app(Arc::new(EchoSystemPrompt));
        for payload in [
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            json!({ "messages": [{ "role": "user", "content": "hi" }], "mode": null }),
        ] {
            let (status, body) = send(&app, "POST", "/v1/chat/completions", Some(payload)).await;
            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(body["data"]["answer"], DEFAULT_TEMPLATE.system_prompt);
            assert!(body["data"]["mode"].is_null());
            assert!(body["data"].get("sources").is_none());
        }
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected_with_allowed_values() {
        let app = app(Arc::new(EchoSystemPrompt));
        let (status, body) = send(
            &app,
            "POST",
            "/v1/chat/completions",
            Some(json!({
                "messages": [{ "role": "user", "content": "hi" }],
                "mode": "oncology"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_MODE");
        let msg = body["error"]["message"].as_str().unwrap();
        assert!(msg.contains("clinical, moa, protein, regulatory"));

        let (status, body) = send(
            &app,
            "POST",
            "/v1/ingest/Clinical",
            Some(json!({ "file_name": "a.txt", "text": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_MODE");
    }

    #[tokio::test]
    async fn ingest_requires_exactly_one_source() {
        let app = app(Arc::new(EchoSystemPrompt));
        for payload in [
            json!({ "file_name": "a.txt" }),
            json!({ "file_name": "a.txt", "text": "x", "path": "/tmp/a.txt" }),
        ] {
            let (status, body) = send(&app, "POST", "/v1/ingest/moa", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "BAD_REQUEST");
        }
    }

    /// Fresh canonical directory holding `trial.txt`, with `secret.txt` one
    /// level above it.
    fn ingest_root(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let base = std::env::temp_dir().join(format!("biorag-api-{tag}-{nanos}"));
        let root = base.join("docs");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("trial.txt"), CLINICAL_TEXT).unwrap();
        std::fs::write(base.join("secret.txt"), "not for ingestion").unwrap();
        root.canonicalize().unwrap()
    }

    #[tokio::test]
    async fn ingest_reads_files_under_the_root() {
        let root = ingest_root("inside");
        let app = app_with_root(Arc::new(EchoSystemPrompt), Some(root));
        let (status, body) = send(
            &app,
            "POST",
            "/v1/ingest/clinical",
            Some(json!({ "file_name": "trial.txt", "path": "trial.txt" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["documents"][0]["metadata"]["dose_schema"], "100mg daily");
    }

    #[tokio::test]
    async fn ingest_rejects_paths_outside_the_root() {
        let root = ingest_root("outside");
        let secret = root.parent().unwrap().join("secret.txt");
        let app = app_with_root(Arc::new(EchoSystemPrompt), Some(root));

        for path in [
            json!("/etc/hosts"),
            json!("../secret.txt"),
            json!(secret.to_string_lossy()),
        ] {
            let (status, body) = send(
                &app,
                "POST",
                "/v1/ingest/clinical",
                Some(json!({ "file_name": "x.txt", "path": path })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(body["error"]["code"], "INVALID_PATH");
            assert_eq!(body["error"]["details"][0]["path"], "path");
        }
    }

    #[tokio::test]
    async fn path_ingestion_is_off_without_a_root() {
        let root = ingest_root("unset");
        let app = app(Arc::new(EchoSystemPrompt));
        let (status, body) = send(
            &app,
            "POST",
            "/v1/ingest/clinical",
            Some(json!({ "file_name": "trial.txt", "path": root.join("trial.txt") })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PATH");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app(Arc::new(EchoSystemPrompt));
        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_bad_gateway() {
        let app = app(Arc::new(Unreachable));
        let (status, body) = send(
            &app,
            "POST",
            "/v1/chat/completions",
            Some(json!({ "messages": [{ "role": "user", "content": "hi" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_LLM_ERROR");
    }

    #[tokio::test]
    async fn wrong_method_gets_enveloped_with_request_id() {
        let app = app(Arc::new(EchoSystemPrompt));
        let req = Request::builder()
            .method("GET")
            .uri("/v1/chat/completions")
            .header("X-Request-Id", "t-1")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["X-Request-Id"], "t-1");
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn health_lists_spaces_even_when_runtime_is_down() {
        let app = app(Arc::new(EchoSystemPrompt));
        let (status, body) = send(&app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["data"]["ok"], false);
        assert_eq!(body["data"]["embeddings"][0]["space"], "default");
        assert_eq!(body["data"]["embeddings"][1]["space"], "bio");
        assert_eq!(body["data"]["embeddings"][1]["dimension"], 96);
        assert_eq!(body["data"]["store"], "memory");
    }
}
