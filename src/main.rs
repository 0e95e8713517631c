use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solarsite::persist::SqliteStore;
use solarsite::server::{self, AppState};
use solarsite::settings::Settings;

// usage: solarsite [config-file]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref())?;
    let store = SqliteStore::open(settings.database.mode())?;
    let state = Arc::new(AppState::new(Arc::new(store), settings.limits.clone()));

    let listener = tokio::net::TcpListener::bind(&settings.server.bind).await?;
    info!(bind = %settings.server.bind, "listening");
    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
