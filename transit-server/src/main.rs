use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::cache::CachedRoutePlanner;
use transit_server::config::ServerConfig;
use transit_server::network::{NetworkSource, SnapshotStore};
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_server=info,tower_http=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let source = match config.source.build() {
        Ok(source) => source,
        Err(e) => {
            error!("failed to create network source: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Fail fast if the network cannot be loaded
    info!(source = %source.describe(), "loading network");
    let store = match SnapshotStore::load(source).await {
        Ok(store) => store,
        Err(e) => {
            error!("failed to load network: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        transfer_penalty = %config.planner.transfer_penalty,
        require_distinct = config.planner.require_distinct_endpoints,
        "planner configured"
    );
    let planner = CachedRoutePlanner::new(store, config.planner.clone(), &config.cache);
    let state = AppState::new(planner);

    // Spawn background task to refresh the network snapshot
    let refresh_planner = Arc::clone(&state.planner);
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            if let Err(e) = refresh_planner.refresh().await {
                warn!("failed to refresh network, keeping previous snapshot: {e}");
            }
        }
    });

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("transit planner listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
