//! Policy gateway.
//!
//! Forwards every request to one upstream, applying the configured header
//! policy chains on the way in and on the way out.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                  GATEWAY                      │
//!   Client Request    │  ┌────────────┐   ┌───────────────────────┐  │
//!   ──────────────────┼─▶│ request id │──▶│ request chain         │──┼──▶ Upstream
//!                     │  └────────────┘   │ add/remove/interceptor│  │
//!                     │                   └───────────────────────┘  │
//!   Client Response   │                   ┌───────────────────────┐  │
//!   ◀─────────────────┼───────────────────│ response chain        │◀─┼─── Upstream
//!                     │                   └───────────────────────┘  │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gateway_policies::config::{load_config, GatewayConfig};
use gateway_policies::http::{GatewayServer, PolicyChains};
use gateway_policies::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gateway-policies")]
#[command(about = "API gateway applying ordered header policies", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print the policy chains, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        let chains = PolicyChains::from_config(&config)?;
        println!("Configuration OK");
        for (label, chain) in [("request", &chains.request), ("response", &chains.response)] {
            println!("{label} chain:");
            for policy in chain.list() {
                println!("  - {} ({})", policy.name(), policy.flow());
            }
        }
        return Ok(());
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!("gateway-policies v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        policies = config.policies.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
