//! Default backend config resolved from environment variables.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL`          = generate endpoint (default `http://ollama:11434/api/generate`)
//! - `OLLAMA_MODEL`        = model identifier (default `llama3.2:1b`)
//! - `OLLAMA_TIMEOUT_SECS` = deadline for connect + stream drain (default `300`)
//!
//! Empty values are treated as unset.

use crate::{
    config::llm_model_config::OllamaConfig,
    error_handler::{AiLlmError, ConfigError, Result, env_opt, validate_http_endpoint},
};

/// Well-known address of the backend inside the compose network.
pub const DEFAULT_OLLAMA_URL: &str = "http://ollama:11434/api/generate";

/// Model sent with every generation request unless overridden.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";

/// Generative responses can take minutes; five is the default ceiling.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

impl OllamaConfig {
    /// Builds the config from the process environment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` is not http(s)
    /// - [`ConfigError::InvalidNumber`] if `OLLAMA_TIMEOUT_SECS` is not a positive integer
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_opt)
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// `lookup` must return `None` for unset (or empty) variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let endpoint = lookup("OLLAMA_URL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        validate_http_endpoint("OLLAMA_URL", &endpoint)?;

        let model = lookup("OLLAMA_MODEL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        if model.is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        let timeout_secs = match lookup("OLLAMA_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AiLlmError::from(ConfigError::InvalidNumber {
                        var: "OLLAMA_TIMEOUT_SECS",
                        reason: "expected positive u64",
                    }));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            model,
            timeout_secs,
        })
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
