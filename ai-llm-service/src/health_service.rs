//! Reachability and model-availability probes for the Ollama runtime.
//!
//! A probe is `GET {endpoint}/api/tags` followed by a lookup of the profile's
//! model in the returned list. [`HealthService::check`] folds every failure
//! into `ok = false` so a `/health` handler can always answer.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Outcome of probing one profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Profile role, e.g. `chat` or `embedding`.
    pub role: String,
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<Tag>,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}

/// Probe result before it is attached to a role.
struct Probe {
    ok: bool,
    latency: Duration,
    message: String,
}

pub struct HealthService {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthService {
    /// # Errors
    /// [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(timeout_secs = timeout.as_secs(), "health service ready");
        Ok(Self { client, timeout })
    }

    /// Probes `cfg` and reports under `role`. Never fails.
    pub async fn check(&self, role: &str, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let probe = match self.probe(cfg).await {
            Ok(p) => p,
            Err(e) => Probe {
                ok: false,
                latency: started.elapsed(),
                message: e.to_string(),
            },
        };

        if probe.ok {
            info!(role, model = %cfg.model, latency_ms = probe.latency.as_millis(), "health probe ok");
        } else {
            warn!(role, model = %cfg.model, endpoint = %cfg.endpoint, message = %probe.message, "health probe failed");
        }

        HealthStatus {
            role: role.to_string(),
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok: probe.ok,
            latency_ms: probe.latency.as_millis(),
            message: probe.message,
        }
    }

    /// Probes each `(role, config)` pair in order.
    pub async fn check_many(&self, profiles: &[(&str, &LlmModelConfig)]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(profiles.len());
        for (role, cfg) in profiles {
            out.push(self.check(role, cfg).await);
        }
        out
    }

    async fn probe(&self, cfg: &LlmModelConfig) -> Result<Probe, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Ok(Probe {
                ok: false,
                latency: Duration::ZERO,
                message: "endpoint is empty or missing http/https".into(),
            });
        }

        match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(endpoint, cfg).await,
        }
    }

    async fn probe_ollama(&self, endpoint: &str, cfg: &LlmModelConfig) -> Result<Probe, AiLlmError> {
        let url = format!("{}/api/tags", endpoint.trim_end_matches('/'));
        let timeout = cfg.timeout_secs.map_or(self.timeout, Duration::from_secs);

        let started = Instant::now();
        let resp = self.client.get(&url).timeout(timeout).send().await?;
        let latency = started.elapsed();

        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError { status, url, snippet }).into());
        }

        // A runtime that answers but with an unexpected body is still reachable.
        let tags = match resp.json::<TagList>().await {
            Ok(t) => t,
            Err(e) => {
                return Ok(Probe {
                    ok: true,
                    latency,
                    message: format!("reachable; could not decode /api/tags: {e}"),
                });
            }
        };

        let found = tags.models.iter().any(|t| model_matches(&t.name, &cfg.model));
        Ok(Probe {
            ok: found,
            latency,
            message: if found {
                "model is available".into()
            } else {
                format!("runtime is up but '{}' is not pulled", cfg.model)
            },
        })
    }
}

/// Ollama lists untagged pulls as `<name>:latest`.
fn model_matches(tag: &str, wanted: &str) -> bool {
    tag == wanted || tag.strip_suffix(":latest") == Some(wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "nomic-embed-text".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[test]
    fn latest_tag_is_implicit() {
        assert!(model_matches("nomic-embed-text:latest", "nomic-embed-text"));
        assert!(model_matches("llama3.1:8b", "llama3.1:8b"));
        assert!(!model_matches("llama3.1:70b", "llama3.1:8b"));
    }

    #[test]
    fn missing_models_field_decodes_empty() {
        let tags: TagList = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[tokio::test]
    async fn invalid_endpoint_reports_not_ok() {
        let svc = HealthService::new(Some(1)).unwrap();
        let status = svc.check("embedding", &cfg("localhost")).await;
        assert!(!status.ok);
        assert_eq!(status.latency_ms, 0);
        assert_eq!(status.role, "embedding");
        assert_eq!(status.provider, "Ollama");
    }

    #[tokio::test]
    async fn unreachable_runtime_reports_not_ok() {
        let svc = HealthService::new(Some(1)).unwrap();
        let out = svc
            .check_many(&[("chat", &cfg("http://127.0.0.1:9"))])
            .await;
        assert_eq!(out.len(), 1);
        assert!(!out[0].ok);
    }
}
