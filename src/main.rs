//! Peer Wins Dashboard
//!
//! Shows peer identifiers with their wallet addresses and win counts, read
//! from the peer registry contract, together with the current round and
//! stage of the network.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    PEER WINS DASHBOARD                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Peer ID Source   ←── peer-ids.txt, re-read per request     │
//! │  Chain Reader     ←── eth_call getEoa / getTotalWins / ...  │
//! │  Retry Wrapper    ←── 3 retries, 1s → 2s → 4s               │
//! │  Mock Provider    ←── synthetic data for local development  │
//! │  HTTP API (3000)  ←── /api/peer-wins, dashboard, metrics    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

mod api;
mod chain;
mod config;
mod dashboard;
mod mock;
mod peers;
mod retry;
mod types;

use api::Metrics;
use chain::{ChainReader, PeerContract, RpcClient};
use config::DashboardConfig;

/// Peer Wins Dashboard - on-chain peer leaderboard
#[derive(Parser, Debug)]
#[command(name = "peer-wins-dashboard")]
#[command(version)]
#[command(about = "Dashboard for peer win counts read from the peer registry contract", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// JSON-RPC endpoint of the chain
    #[arg(long, env = "PROVIDER_URL")]
    rpc_url: Option<String>,

    /// Address of the peer registry contract
    #[arg(long, env = "CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Serve mock data instead of querying the chain (only "true" enables it)
    #[arg(long, env = "USE_MOCK_DATA", value_parser = parse_mock_flag)]
    use_mock_data: Option<bool>,

    /// File listing peer ids, one per line
    #[arg(long, env = "PEER_IDS_FILE")]
    peer_ids_file: Option<PathBuf>,

    /// HTTP port for the API and dashboard
    #[arg(long)]
    api_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Any value other than exactly `true` selects live data
fn parse_mock_flag(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(value == "true")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into())
        )
        .init();

    info!("🏆 Peer Wins Dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = if args.config.exists() {
        DashboardConfig::load(&args.config)?
    } else {
        warn!("Config file {:?} not found, using defaults", args.config);
        DashboardConfig::default()
    };

    // Override config with CLI args and environment
    let config = config
        .with_rpc_url(args.rpc_url)
        .with_contract_address(args.contract_address)
        .with_mock_data(args.use_mock_data)
        .with_peer_ids_file(args.peer_ids_file)
        .with_api_port(args.api_port);

    config.validate()?;

    info!("⚙️  Configuration:");
    info!("   Mock data: {}", config.use_mock_data);
    info!("   Peer ids file: {:?}", config.peer_ids_file);
    info!("   API port: {}", config.api_port);
    info!(
        "   Retries: {} (initial delay {}ms, worst case {}ms per read), win pacing {}ms",
        config.max_retries,
        config.retry_delay_ms,
        config.retry_policy().total_delay().as_millis(),
        config.win_pacing_ms
    );

    let reader = build_chain_reader(&config)?;
    if reader.is_none() {
        warn!("No RPC endpoint or contract configured, only mock data is available");
    }

    let shared_config = Arc::new(config);
    let metrics = Arc::new(Metrics::new());

    let api_handle = tokio::spawn(api::run_api_server(
        shared_config.clone(),
        reader,
        metrics.clone(),
    ));

    info!("   Press Ctrl+C to shutdown");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
        }
        result = api_handle => {
            error!("HTTP API exited: {:?}", result);
        }
    }

    info!(
        "👋 Peer Wins Dashboard shutting down after {}s",
        metrics.uptime_secs()
    );
    Ok(())
}

/// Chain reader for the configured endpoint, if both endpoint and contract are set
fn build_chain_reader(config: &DashboardConfig) -> anyhow::Result<Option<Arc<ChainReader>>> {
    let (Some(url), Some(address)) = (&config.rpc_url, config.parsed_contract_address()?) else {
        return Ok(None);
    };

    info!("⛓️  Chain RPC: {}", url);
    info!("   Contract: {}", address);

    let contract = PeerContract::new(RpcClient::new(url), address);
    Ok(Some(Arc::new(ChainReader::new(
        Arc::new(contract),
        config.retry_policy(),
        config.win_pacing(),
    ))))
}
