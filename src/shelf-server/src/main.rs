//! Shelf — personal reading library with book recommendations.
//!
//! Main entry point that wires the stores, the recommendation engine and the
//! background refresh worker, then starts the HTTP server.

use clap::Parser;
use shelf_api::{ApiServer, AppState};
use shelf_core::config::AppConfig;
use shelf_library::LibraryService;
use shelf_recommendations::{
    PreferenceRecomputer, RecommendationEngine, RefreshDispatcher, RefreshScheduler,
};
use shelf_store::seed::{seed_demo_data, DEMO_NEWCOMER_ID, DEMO_READER_ID};
use shelf_store::MemoryStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "shelf-server")]
#[command(about = "Personal reading library with preference-based recommendations")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "SHELF__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "SHELF__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Prometheus exporter port (overrides config)
    #[arg(long, env = "SHELF__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Start with an empty store instead of the demo catalog
    #[arg(long, default_value_t = false)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_server=info,shelf_api=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Shelf starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        max_limit = config.recommendations.max_limit,
        pool_factor = config.recommendations.pool_factor,
        "Configuration loaded"
    );

    let store = Arc::new(MemoryStore::new());
    let recomputer = Arc::new(PreferenceRecomputer::new(store.clone()));

    if !cli.no_seed {
        seed_demo_data(&store)?;
        for user_id in [DEMO_READER_ID, DEMO_NEWCOMER_ID] {
            if let Err(e) = recomputer.recompute(user_id) {
                error!(user_id = %user_id, error = %e, "Failed to build demo preferences");
            }
        }
    }

    let refresh: Arc<dyn RefreshDispatcher> = Arc::new(RefreshScheduler::spawn(
        recomputer.clone(),
        config.recommendations.refresh_queue_capacity,
    ));

    let state = AppState {
        engine: Arc::new(RecommendationEngine::new(
            store.clone(),
            store.clone(),
            config.recommendations.clone(),
        )),
        recomputer,
        library: Arc::new(LibraryService::new(store.clone(), store, refresh)),
        node_id: config.node_id.clone(),
        start_time: Instant::now(),
    };

    let api_server = ApiServer::new(config, state);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Shelf is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
