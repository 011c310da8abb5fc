//! # Skyhop
//!
//! Runner binary: one invocation, one tick. Meant to be driven by an
//! external scheduler that never overlaps runs.

use rand::rngs::StdRng;
use rand::SeedableRng;
use skyhop_engine::TravelerEngine;
use skyhop_gateway::OpenSkyClient;
use skyhop_state::JsonFileStateStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod runner;

use config::NodeConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Configuration problems end the run before the state file is touched.
    let config = NodeConfig::from_env()?;

    info!("Skyhop tick starting (state: {})", config.paths.state.display());

    let client = OpenSkyClient::new(config.opensky())?;
    info!(
        "OpenSky client ready ({}, authenticated: {})",
        config.base_url,
        client.is_authenticated()
    );
    let engine = TravelerEngine::new(client);
    let store = JsonFileStateStore::new(&config.paths.state);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let now_utc = chrono::Utc::now().timestamp();
    let report = runner::run_tick(&engine, &store, &config.paths, now_utc, &mut rng).await?;

    println!("{}", report.status_line());
    Ok(())
}
