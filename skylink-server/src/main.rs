mod api;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::sync::Mutex;

use skylink_core::{AirlineState, EconomyConfig, StateStore};

use api::AppState;
use store::JsonFileStore;

#[derive(Debug, Parser)]
#[command(name = "skylink-server", version)]
#[command(about = "PIREP settlement service for Skylink ACARS")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Economy config JSON (defaults apply for missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Airline state snapshot path; omit for a purely in-memory datastore
    #[arg(long)]
    state: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<EconomyConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EconomyConfig::from_json(&json).context("parsing economy config")?
        }
        None => EconomyConfig::default(),
    };

    // Deployment override used by ops without touching the config file.
    if let Ok(raw) = std::env::var("AUTO_PIREP_REJECT_LANDING_RATE") {
        match raw.parse::<f64>() {
            Ok(rate) if rate < 0.0 => config.auto_reject_landing_rate = rate,
            _ => warn!("ignoring invalid AUTO_PIREP_REJECT_LANDING_RATE={raw}"),
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let secret = std::env::var("SKYLINK_APP_KEY").ok().filter(|s| !s.is_empty());
    if secret.is_none() {
        warn!("SKYLINK_APP_KEY not set; PIREP signatures will not be verified");
    }

    let store = args.state.clone().map(JsonFileStore::new);
    let airline = match &store {
        Some(store) => store
            .load()
            .context("loading airline state snapshot")?
            .unwrap_or_default(),
        None => AirlineState::default(),
    };
    info!(
        "airline state: {} pilots, {} aircraft, {} flights",
        airline.pilots.len(),
        airline.fleet.len(),
        airline.flights.len()
    );

    let state = Arc::new(AppState {
        airline: Mutex::new(airline),
        config,
        secret,
        store,
    });

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!("listening on {}", args.bind);
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
