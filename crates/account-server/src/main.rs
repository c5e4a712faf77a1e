//! Account Service - user registration, login and profiles over HTTP

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use account_api::{AppState, create_router};
use account_auth::{Secret, TokenSigner, TokenValidator};
use account_db::Database;
use config::{Config, LoggingConfig};

/// Account Service - user accounts guarded by signed session tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "ACCOUNT_SERVICE_CONFIG")]
    config: String,

    /// Bind address
    #[arg(long, env = "ACCOUNT_SERVICE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "ACCOUNT_SERVICE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging);

    info!("Starting Account Service v{}", env!("CARGO_PKG_VERSION"));
    config.warn_insecure_defaults();

    // Create data directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db = Database::new(&config.database_url()).await?;

    // The secret is handed to signer and validator here and nowhere else
    let secret = Secret::new(config.auth.jwt_secret.clone());
    let ttl = config.auth.token_ttl_hours.map(chrono::Duration::hours);
    let signer = TokenSigner::new(&secret, ttl);
    let validator = TokenValidator::new(&secret);

    let state = AppState::new(db, signer, validator, config.pagination.users_per_page);

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let app = create_router(state, Some(Arc::new(metrics_handle)));

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
