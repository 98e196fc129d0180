use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::core::app_state::ConfigError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("Disallowed CORS origin: {0}")]
    CorsOriginDenied(String),

    // --- Backend ---
    #[error(transparent)]
    Backend(#[from] AiLlmError),

    /// Anything that escaped the typed paths (e.g. a panic in the backend call).
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::CorsOriginDenied(_) => StatusCode::BAD_REQUEST,

            // 5xx; backend failures of every kind collapse to a server error
            AppError::Config(_)
            | AppError::Bind { .. }
            | AppError::Server(_)
            | AppError::Backend(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::CorsOriginDenied(_) => "CORS_ORIGIN_DENIED",
            AppError::Backend(e) if e.is_connectivity() => "BACKEND_UNAVAILABLE",
            AppError::Backend(AiLlmError::HttpStatus { .. }) => "BACKEND_HTTP_ERROR",
            AppError::Backend(_) | AppError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Human-readable text placed in the `detail` field.
    pub fn detail(&self) -> String {
        match self {
            AppError::Backend(e) if e.is_connectivity() => {
                format!("Error communicating with Ollama: {e}")
            }
            AppError::Backend(e @ AiLlmError::HttpStatus { .. }) => {
                format!("HTTP error from Ollama: {e}")
            }
            AppError::Backend(e) => format!("Unexpected error: {e}"),
            AppError::Unexpected(msg) => format!("Unexpected error: {msg}"),
            other => other.to_string(),
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            detail: self.detail(),
            hint: None,
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_is_reported_as_backend_unavailable() {
        let err = AppError::from(AiLlmError::Timeout(Duration::from_secs(300)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "BACKEND_UNAVAILABLE");
        assert!(err.detail().starts_with("Error communicating with Ollama: "));
        assert!(err.detail().contains("timed out"));
    }

    #[test]
    fn status_failure_keeps_backend_context() {
        let err = AppError::from(AiLlmError::HttpStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "http://ollama:11434/api/generate".into(),
            snippet: "loading model".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "BACKEND_HTTP_ERROR");
        let detail = err.detail();
        assert!(detail.starts_with("HTTP error from Ollama: "));
        assert!(detail.contains("503"), "{detail}");
        assert!(detail.contains("loading model"), "{detail}");
    }

    #[test]
    fn other_backend_errors_are_unexpected() {
        let err = AppError::from(AiLlmError::Config(
            ai_llm_service::ConfigError::EmptyModel,
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "UNEXPECTED_ERROR");
        assert!(err.detail().starts_with("Unexpected error: "));
    }

    #[test]
    fn cors_denial_is_client_error() {
        let err = AppError::CorsOriginDenied("https://evil.example".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Disallowed CORS origin: https://evil.example");
    }

    #[tokio::test]
    async fn response_body_has_code_and_detail_only() {
        let resp = AppError::Unexpected("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "UNEXPECTED_ERROR", "detail": "Unexpected error: boom" })
        );
    }
}
