use anyhow::{Context, Result};
use b1_core::GatewayConfig;
use b1_gateway::http_server;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "b1-gateway",
    about = "JSON gateway in front of the SAP Business One Service Layer",
    version
)]
struct Args {
    /// Path to config file (defaults to ./config.json, then ~/.config/b1-gateway/config.json)
    #[arg(short, long, env = "B1_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides Server.BindAddress
    #[arg(short, long, env = "B1_GATEWAY_BIND")]
    bind: Option<SocketAddr>,

    /// Service Layer base URL, overrides ServiceLayerURL
    #[arg(long, env = "SL_URL")]
    service_layer_url: Option<String>,

    /// Directory of the prebuilt web client, overrides Server.StaticDir
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "B1_GATEWAY_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env has to be in place before clap reads the environment
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    info!("Starting b1-gateway");

    // Load config from file or use defaults
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load_from_file(path)
            .with_context(|| format!("Configuration error in {}", path.display()))?,
        None => GatewayConfig::load_from_default().context("Configuration error")?,
    };

    // Update config from CLI args
    if let Some(url) = args.service_layer_url {
        config.service_layer_url = url;
    }

    if let Some(static_dir) = args.static_dir {
        config.server.static_dir = static_dir;
    }

    let addr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid BindAddress {:?}", config.server.bind_address))?,
    };

    if let Err(e) = http_server::run_server(config, addr).await {
        error!(error = %e, "HTTP server failed");
        return Err(e);
    }

    info!("b1-gateway shutting down");
    Ok(())
}
