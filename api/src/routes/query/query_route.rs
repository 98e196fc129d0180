//! POST /query: forwards free text to the backend and returns one aggregated answer.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use axum::{Json, extract::State, http::HeaderMap};
use futures::FutureExt;
use tracing::{debug, error, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::query::{
        query_request::{QueryRequest, QueryResponse},
        sanitize::sanitize_query,
    },
};

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "backend call panicked".to_string()
    }
}

/// Handler: POST /query
///
/// The answer is fully buffered before responding; callers never see a
/// partial answer. If the caller goes away, the handler future is dropped
/// and the backend connection closes with it.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/query \
///   -H 'content-type: application/json' \
///   -d '{"query":"Why is the sky blue?"}'
/// ```
#[instrument(name = "query_route", skip_all, fields(request_id = %request_id(&headers)))]
pub async fn query_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    debug!(endpoint = %state.ollama.config().endpoint, "using backend endpoint");

    let sanitized = sanitize_query(&body.query);
    debug!(query = %sanitized, "sanitized query");

    let outcome = AssertUnwindSafe(state.ollama.generate_stream(&sanitized))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(answer)) => {
            debug!(answer = %answer, "final answer");
            Ok(Json(QueryResponse { response: answer }))
        }
        Ok(Err(err)) => {
            error!(error = %err, "backend call failed");
            Err(AppError::from(err))
        }
        Err(payload) => {
            let msg = panic_message(&*payload);
            error!(error = %msg, "backend call panicked");
            Err(AppError::Unexpected(msg))
        }
    }
}
