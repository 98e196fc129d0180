//! Allow-list CORS for browser callers.
//!
//! Credentials are allowed, so the matched origin is echoed back instead of
//! `*`. Any method and any request header are accepted for allowed origins.
//!
//! - No `Origin` header: request passes through unmodified.
//! - Preflight (`OPTIONS` + `Access-Control-Request-Method`) from an allowed
//!   origin is answered directly with `200`; the handler is not called.
//! - Preflight from any other origin gets `400 CORS_ORIGIN_DENIED`.
//! - Actual requests run normally; CORS headers are added only for allowed
//!   origins and the browser blocks the rest.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::error_handler::AppError;

/// Methods advertised on preflight responses.
const ALLOW_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";

/// Preflight cache lifetime in seconds.
const MAX_AGE_SECS: &str = "600";

/// Origins permitted to call the gateway from a browser.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: Vec<String>,
    allow_any: bool,
}

impl CorsPolicy {
    pub fn new(origins: &[String]) -> Self {
        Self {
            allow_any: origins.iter().any(|o| o == "*"),
            origins: origins.iter().filter(|o| *o != "*").cloned().collect(),
        }
    }

    /// Exact match on the serialized origin (`scheme://host[:port]`).
    pub fn allows(&self, origin: &str) -> bool {
        self.allow_any || self.origins.iter().any(|o| o == origin)
    }
}

fn apply_origin_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}

fn preflight_response(origin: HeaderValue, requested_headers: Option<HeaderValue>) -> Response {
    let mut res = StatusCode::OK.into_response();
    let headers = res.headers_mut();

    apply_origin_headers(headers, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    if let Some(requested) = requested_headers {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
    }
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    res
}

/// Middleware entry point; mount with `axum::middleware::from_fn_with_state`.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(origin) = req.headers().get(header::ORIGIN).cloned() else {
        return next.run(req).await;
    };

    let origin_str = origin.to_str().unwrap_or_default().to_string();
    let allowed = !origin_str.is_empty() && policy.allows(&origin_str);

    let is_preflight = req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight {
        if !allowed {
            warn!(origin = %origin_str, "preflight from disallowed origin");
            return AppError::CorsOriginDenied(origin_str).into_response();
        }
        debug!(origin = %origin_str, "preflight accepted");
        let requested = req
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();
        return preflight_response(origin, requested);
    }

    let mut res = next.run(req).await;
    if allowed {
        apply_origin_headers(res.headers_mut(), origin);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_origin_match() {
        let policy = CorsPolicy::new(&["http://localhost:8081".to_string()]);
        assert!(policy.allows("http://localhost:8081"));
        assert!(!policy.allows("http://localhost:8082"));
        assert!(!policy.allows("https://localhost:8081"));
    }

    #[test]
    fn wildcard_allows_everything() {
        let policy = CorsPolicy::new(&["*".to_string()]);
        assert!(policy.allows("https://anything.example"));
    }

    #[test]
    fn empty_list_allows_nothing() {
        let policy = CorsPolicy::new(&[]);
        assert!(!policy.allows("http://localhost:8081"));
    }

    #[test]
    fn preflight_echoes_origin_and_headers() {
        let res = preflight_response(
            HeaderValue::from_static("http://localhost:8081"),
            Some(HeaderValue::from_static("content-type,x-request-id")),
        );
        let h = res.headers();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:8081");
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type,x-request-id");
        assert!(
            h[header::ACCESS_CONTROL_ALLOW_METHODS]
                .to_str()
                .unwrap()
                .contains("POST")
        );
        assert_eq!(h[header::VARY], "Origin");
    }
}
