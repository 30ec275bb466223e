//! wallet-server
//!
//! ```text
//!   client ──▶ listener ──▶ http (middleware, handlers)
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!            auth          store::wallets   blockchain
//!       (bcrypt, JWT,     (ledger, logs)   (Solana RPC,
//!        revocations)          │            failover)
//!              │               ▼
//!              └──────▶ data_dir/*.json
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use wallet_server::blockchain::SolanaGateway;
use wallet_server::config::load_config;
use wallet_server::lifecycle::signals::wait_for_signal;
use wallet_server::lifecycle::startup::open_stores;
use wallet_server::observability::{logging, metrics};
use wallet_server::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "wallet-server", version, about = "Wallet API server")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("wallet-server v{} starting", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret == wallet_server::config::schema::PLACEHOLDER_JWT_SECRET {
        tracing::warn!("Using the placeholder JWT secret; set JWT_SECRET in production");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.blockchain.rpc_url,
        token_ttl_secs = config.auth.token_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (users, wallets) = open_stores(&config.storage)?;
    let gateway = Arc::new(SolanaGateway::new(config.blockchain.clone())?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config, gateway, users, wallets)
        .run(listener, &shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
