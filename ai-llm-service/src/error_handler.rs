//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library and groups configuration problems in [`ConfigError`]. Small helpers for
//! reading/validating environment variables are provided; the fallible ones return
//! the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
///
/// Variants separate the moments a backend call can fail: before a response
/// head arrives ([`AiLlmError::Connect`]), on a non-success status
/// ([`AiLlmError::HttpStatus`]), while draining the body ([`AiLlmError::Stream`])
/// and when the overall deadline expires ([`AiLlmError::Timeout`]).
/// Malformed stream lines are never an error; the aggregator drops them.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup only).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client itself could not be constructed.
    #[error("[AI LLM Service] failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request could not be sent or no response head was received.
    #[error("[AI LLM Service] connection error: {0}")]
    Connect(#[source] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// The response body was interrupted while streaming.
    #[error("[AI LLM Service] stream interrupted: {0}")]
    Stream(#[source] reqwest::Error),

    /// Connect + full stream drain exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// `true` when the failure is about reaching or reading from the backend
    /// (connect, mid-stream drop, deadline), as opposed to a status reply.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            AiLlmError::Connect(_) | AiLlmError::Stream(_) | AiLlmError::Timeout(_)
        )
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `OLLAMA_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OLLAMA_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional environment variable; empty or whitespace-only values
/// count as unset.
pub fn env_opt(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Cuts a response body down to a log/detail-friendly snippet.
pub fn make_snippet(body: &str) -> String {
    body.trim().chars().take(240).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_scheme_is_checked() {
        assert!(validate_http_endpoint("OLLAMA_URL", "http://ollama:11434/api/generate").is_ok());
        assert!(validate_http_endpoint("OLLAMA_URL", " https://x ").is_ok());

        let err = validate_http_endpoint("OLLAMA_URL", "ollama:11434").unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidFormat { var: "OLLAMA_URL", .. })
        ));
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(make_snippet(&long).len(), 240);
        assert_eq!(make_snippet("  model not found \n"), "model not found");
    }

    #[test]
    fn timeout_counts_as_connectivity() {
        assert!(AiLlmError::Timeout(Duration::from_secs(1)).is_connectivity());
        assert!(!AiLlmError::Config(ConfigError::EmptyModel).is_connectivity());
        assert!(
            !AiLlmError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                url: "http://x".into(),
                snippet: String::new(),
            }
            .is_connectivity()
        );
    }
}
