pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::sync::Arc;

use axum::{Router, middleware, routing::post};
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::{AppState, GatewayConfig},
    error_handler::{AppError, AppResult},
    middleware_layer::{
        cors::{CorsPolicy, cors_middleware},
        json_extractor::json_error_mapper,
    },
    routes::query::query_route::query_route,
};

/// Builds the application router without binding a socket.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = Arc::new(CorsPolicy::new(&state.config.allowed_origins));

    Router::new()
        .route("/query", post(query_route))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
        .with_state(state)
}

/// Binds `config.api_address` and serves until Ctrl+C.
pub async fn start(config: GatewayConfig) -> AppResult<()> {
    let addr = config.api_address.clone();
    let state = Arc::new(AppState::new(config)?);

    info!(
        %addr,
        backend = %state.ollama.config().endpoint,
        model = %state.ollama.config().model,
        origins = ?state.config.allowed_origins,
        "starting query gateway"
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("query gateway stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
