//! Backend side of the query gateway: env-driven Ollama config, a streaming
//! generate client and the NDJSON aggregator it feeds.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod stream_aggregator;
pub mod telemetry;

pub use config::llm_model_config::OllamaConfig;
pub use error_handler::{AiLlmError, ConfigError};
pub use services::ollama_service::OllamaService;
pub use stream_aggregator::StreamAggregator;
