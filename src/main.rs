use txhandler::{
    api::Server,
    config::Config,
    epoch::{EpochOrchestrator, serve_until_stopped},
    pool::CandidatePool,
    registry::Registry,
    state::LedgerState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the handler node.
///
/// Loads the configuration, seeds the pool from the genesis file, starts the epoch
/// orchestrator in the background and serves the API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Handler starting with config: {:?}", config);

    let pool = config.ledger.load_pool()?;
    info!("Genesis pool loaded: {} utxos, total value {}", pool.len(), pool.total_value());
    let ledger = LedgerState::new(&pool);

    let registry = Arc::new(Registry::connect(&config.database.url).await?);

    // Shared between the API server and the orchestrator
    let candidates = Arc::new(CandidatePool::new());

    let orchestrator = EpochOrchestrator::new(
        candidates.clone(),
        ledger.clone(),
        registry.clone(),
        config.epoch.clone(),
    );
    let orchestrator_task = tokio::spawn(orchestrator.start());
    info!("Epoch orchestrator started");

    let server = Server::new(config.api, ledger, candidates, registry);

    serve_until_stopped(server.start(), orchestrator_task).await
}
