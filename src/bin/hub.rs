use std::sync::Arc;

use clap::Parser;
use durga_guardian::{
    api::{ApiConfig, ApiState, StreamSettings, spawn_api_server},
    config::{Config, read_config_file},
    coordinator::AlertCoordinator,
    registry::ConnectionRegistry,
    storage::AlertStore,
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Real-time SOS alert broadcast hub")]
struct Args {
    /// Config file (JSON); defaults and DURGA_ADDR / DURGA_PORT apply without one
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("durga_guardian", LevelFilter::DEBUG),
        ("durga_hub", LevelFilter::TRACE),
        ("tower_http", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let store = Arc::new(AlertStore::new());
    let registry = Arc::new(ConnectionRegistry::with_max_dropped_events(
        config.max_dropped_events,
    ));
    let coordinator = AlertCoordinator::new(store, registry);

    let state = ApiState::new(coordinator, StreamSettings::from(&config));
    let addr = spawn_api_server(ApiConfig::from(&config), state).await?;

    info!("guardian hub online at {addr}");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}
