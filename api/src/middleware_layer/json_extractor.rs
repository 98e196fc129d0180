use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::warn;

use crate::error_handler::ErrorBody;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn hint_from_serde_msg(msg: &str) -> Option<String> {
    if msg.contains("missing field `query`") {
        Some("Send a JSON object with a text field, e.g. {\"query\": \"...\"}.".into())
    } else if msg.contains("invalid type") && msg.contains("expected a string") {
        Some("`query` must be a JSON string.".into())
    } else if msg.contains("Content-Type") {
        Some("Set the `Content-Type: application/json` header.".into())
    } else if msg.contains("expected a map") || msg.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"query\": \"value\" }).".into())
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts
        .headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(value) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", value);
    }
    id
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Rewrites axum's plain-text extractor rejections (400/415/422) into the
/// gateway's JSON error body. Responses that are already JSON pass through.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => return res,
    };

    let (mut parts, bytes) = take_body(res).await;
    if is_json(&parts) {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let original = String::from_utf8_lossy(&bytes);
    let request_id = ensure_request_id(&mut parts);
    warn!(%request_id, %status, reason = %original.trim(), "request rejected");

    let envelope = ErrorBody {
        error: code,
        detail: original.trim().to_string(),
        hint: hint_from_serde_msg(&original),
    };

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_cover_common_rejections() {
        assert!(
            hint_from_serde_msg(
                "Failed to deserialize the JSON body into the target type: missing field `query` at line 1 column 2"
            )
            .is_some_and(|h| h.contains("\"query\""))
        );
        assert!(
            hint_from_serde_msg("Expected request with `Content-Type: application/json`").is_some()
        );
        assert!(hint_from_serde_msg("something else entirely").is_none());
    }
}
