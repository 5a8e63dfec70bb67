//! Main entry point for the Virtual Try-On Studio

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tryon_studio::{
    api,
    config::{LoggingConfig, Settings},
    provider::{GeminiProvider, GenerationProvider},
    studio::Studio,
    AppState,
};

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "pretty" {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Missing credential is fatal here, before anything is served
    let settings = Settings::load()?;
    init_logging(&settings.logging);

    info!("Starting Virtual Try-On Studio");
    info!(
        "Loaded configuration: server={}:{} model={}",
        settings.server.host, settings.server.port, settings.provider.model
    );

    let provider: Arc<dyn GenerationProvider> = Arc::new(GeminiProvider::new(&settings.provider)?);
    let studio = Arc::new(Studio::new(provider));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app_state = Arc::new(AppState {
        settings: Arc::new(settings),
        studio,
    });

    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
