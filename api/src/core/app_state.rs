use ai_llm_service::{AiLlmError, OllamaConfig, OllamaService, error_handler::env_opt};
use thiserror::Error;

/// Listener address used when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";

/// Origin allowed when `ALLOWED_ORIGINS` is unset (local web dev server).
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8081";

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid origin in ALLOWED_ORIGINS: {0:?} (expected \"*\" or an http(s) origin)")]
    InvalidOrigin(String),

    #[error(transparent)]
    Backend(#[from] AiLlmError),
}

/// Process-wide configuration, resolved once in `main` and injected.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address the HTTP listener binds to, e.g. `0.0.0.0:8000`.
    pub api_address: String,
    /// Browser origins allowed to call the gateway (`*` allows any).
    pub allowed_origins: Vec<String>,
    /// Generative backend settings.
    pub llm: OllamaConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// - `API_ADDRESS`     (default `0.0.0.0:8000`)
    /// - `ALLOWED_ORIGINS` (default `http://localhost:8081`, comma-separated)
    /// - `OLLAMA_URL`, `OLLAMA_MODEL`, `OLLAMA_TIMEOUT_SECS` (see `ai-llm-service`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_opt)
    }

    /// Same as [`GatewayConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let api_address = lookup("API_ADDRESS")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

        let raw_origins =
            lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());
        let allowed_origins = parse_origins(&raw_origins)?;

        let llm = OllamaConfig::from_lookup(&lookup)?;

        Ok(Self {
            api_address,
            allowed_origins,
            llm,
        })
    }
}

/// Splits a comma-separated origin list; blanks are dropped, trailing `/` removed.
pub fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            if o == "*" || o.starts_with("http://") || o.starts_with("https://") {
                Ok(o.trim_end_matches('/').to_string())
            } else {
                Err(ConfigError::InvalidOrigin(o.to_string()))
            }
        })
        .collect()
}

/// Shared state for all HTTP handlers.
///
/// Read-only after startup; every request works on its own locals.
#[derive(Debug)]
pub struct AppState {
    pub config: GatewayConfig,
    /// Backend client (one fresh connection per call).
    pub ollama: OllamaService,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let ollama = OllamaService::new(config.llm.clone())?;
        Ok(Self { config, ollama })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:8000");
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:8081"]);
        assert_eq!(cfg.llm, OllamaConfig::default());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[(
            "ALLOWED_ORIGINS",
            " http://localhost:8081 , https://app.example.com/,, ",
        )]))
        .unwrap();
        assert_eq!(
            cfg.allowed_origins,
            vec!["http://localhost:8081", "https://app.example.com"]
        );
    }

    #[test]
    fn wildcard_origin_is_accepted() {
        assert_eq!(parse_origins("*").unwrap(), vec!["*"]);
    }

    #[test]
    fn junk_origin_is_rejected() {
        let err = parse_origins("http://ok.example, localhost:3000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin(o) if o == "localhost:3000"));
    }

    #[test]
    fn backend_errors_bubble_up() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("OLLAMA_URL", "ollama:11434")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Backend(AiLlmError::Config(_))));
    }
}
