//! Main entry point for the Mask of the Phantasm API

use phantasm_api::{
    api,
    config::{LoggingConfig, Settings},
    imagery::{EarthEngineClient, ImageryPlatform},
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;

    init_tracing(&settings.logging);

    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let client = Arc::new(EarthEngineClient::new(&settings.earth_engine)?);

    // Startup continues without credentials; samplers retry on first use
    if let Err(e) = client.initialize().await {
        warn!(error = %e, "Could not initialize Earth Engine");
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let platform: Arc<dyn ImageryPlatform> = client;
    let app_state = Arc::new(AppState::new(settings, platform));

    let app = api::routes::create_router(app_state).await;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
