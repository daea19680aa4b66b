use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use isochrone_server::cache::CacheConfig;
use isochrone_server::controller::RunController;
use isochrone_server::data::{DataBackend, DataClient, DataClientConfig, MockDataClient};
use isochrone_server::search::SearchConfig;
use isochrone_server::web::{AppState, create_router};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

fn data_backend() -> Result<DataBackend, Box<dyn std::error::Error>> {
    if let Ok(dir) = std::env::var("ISOCHRONE_MOCK_DIR") {
        info!(dir = %dir, "using mock data");
        return Ok(DataBackend::Mock(MockDataClient::load_dir(&dir)?));
    }

    let base_url = std::env::var("ISOCHRONE_DATA_URL")
        .map_err(|_| "set ISOCHRONE_DATA_URL or ISOCHRONE_MOCK_DIR")?;
    let mut config = DataClientConfig::new(&base_url);
    if let Ok(key) = std::env::var("ISOCHRONE_API_KEY") {
        config = config.with_api_key(key);
    }
    info!(base_url = %base_url, "using HTTP data");
    Ok(DataBackend::Http(DataClient::new(config)?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let backend = data_backend()?;
    let controller = RunController::new(backend, &CacheConfig::default(), SearchConfig::default());

    // Warm the location table; requests retry the load if this fails.
    match controller.locations().await {
        Ok(table) => info!(locations = table.len(), "loaded locations"),
        Err(e) => warn!(error = %e, "failed to load locations"),
    }

    let app = create_router(AppState::new(controller));

    let addr: SocketAddr = std::env::var("ISOCHRONE_BIND")
        .unwrap_or_else(|_| DEFAULT_BIND.to_string())
        .parse()?;
    info!(%addr, "isochrone server listening");
    info!("  GET  /health     - Health check");
    info!("  GET  /stats      - Cache and run statistics");
    info!("  POST /isochrone  - Start a run (server-sent events)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
