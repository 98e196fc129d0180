use api::core::app_state::GatewayConfig;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ai_llm_service::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env when present; the process
    // environment alone is enough otherwise.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter(telemetry::DEFAULT_FILTER))
        .with(telemetry::layer())
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => return Err(e.into()),
    }

    let config = GatewayConfig::from_env().inspect_err(|e| error!(error = %e, "invalid config"))?;

    api::start(config).await?;

    Ok(())
}
