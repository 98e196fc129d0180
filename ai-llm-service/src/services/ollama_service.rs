//! Streaming Ollama client for the generate endpoint.
//!
//! `POST {endpoint}` with `{"model": ..., "prompt": ...}`; Ollama answers with a
//! newline-delimited JSON stream that is folded by
//! [`StreamAggregator`](crate::stream_aggregator::StreamAggregator) into one
//! answer string.
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::config::llm_model_config::OllamaConfig;
//! use ai_llm_service::services::ollama_service::OllamaService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = OllamaService::new(OllamaConfig::default())?;
//! let answer = svc.generate_stream("Write a haiku about Rust.").await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

use futures::StreamExt;
use reqwest::header;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::{
    config::llm_model_config::OllamaConfig,
    error_handler::{AiLlmError, Result, make_snippet, validate_http_endpoint},
    stream_aggregator::StreamAggregator,
};

/// Thin client for Ollama's streaming generate API.
///
/// Cheap to share behind an `Arc`. The inner client keeps no idle
/// connections, so each call opens its own connection and closes it on every
/// exit path (success, error, or the future being dropped).
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: OllamaConfig,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Config`] if `cfg.endpoint` is not an http(s) URL
    /// - [`AiLlmError::HttpClient`] if the HTTP client cannot be built
    pub fn new(cfg: OllamaConfig) -> Result<Self> {
        validate_http_endpoint("OLLAMA_URL", &cfg.endpoint)?;

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(AiLlmError::HttpClient)?;

        Ok(Self { client, cfg })
    }

    /// Backend configuration this service was built with.
    pub fn config(&self) -> &OllamaConfig {
        &self.cfg
    }

    /// Sends `prompt` to the backend and aggregates the streamed answer.
    ///
    /// The whole interaction (connect, status, full body drain) is bounded by
    /// `cfg.timeout_secs`; on expiry the partial answer is thrown away.
    ///
    /// # Errors
    /// - [`AiLlmError::Connect`] if the request cannot be sent
    /// - [`AiLlmError::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::Stream`] if the body breaks off mid-stream
    /// - [`AiLlmError::Timeout`] if the deadline passes
    #[instrument(skip_all, fields(model = %self.cfg.model, prompt_len = prompt.len()))]
    pub async fn generate_stream(&self, prompt: &str) -> Result<String> {
        let deadline = self.cfg.timeout();

        match tokio::time::timeout(deadline, self.generate_inner(prompt)).await {
            Ok(res) => res,
            Err(_) => {
                error!(timeout_secs = deadline.as_secs(), "generation timed out");
                Err(AiLlmError::Timeout(deadline))
            }
        }
    }

    async fn generate_inner(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
        };

        debug!("POST {}", self.cfg.endpoint);
        let resp = self
            .client
            .post(&self.cfg.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(AiLlmError::Connect)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AiLlmError::HttpStatus {
                status,
                url: self.cfg.endpoint.clone(),
                snippet: make_snippet(&text),
            });
        }

        let mut aggregator = StreamAggregator::new();
        let mut chunks = std::pin::pin!(resp.bytes_stream());
        let mut received = 0usize;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(AiLlmError::Stream)?;
            received += chunk.len();
            aggregator.feed(&chunk);
        }

        debug!(
            bytes = received,
            pieces = aggregator.piece_count(),
            leftover = aggregator.pending_bytes(),
            "stream drained"
        );

        let answer = aggregator.finalize();
        debug!(answer_len = answer.len(), "final answer assembled");
        Ok(answer)
    }
}

/* ==========================
HTTP payloads
========================== */

/// Request body for the generate endpoint.
///
/// `stream` is left out on purpose: Ollama streams by default.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}
