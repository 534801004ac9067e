// ABOUTME: Server binary for the Leaky Bucket token issuance API
// ABOUTME: Loads configuration, initializes logging and storage, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

//! # Leaky Bucket Server Binary
//!
//! Starts the HTTP API together with the token replenishment scheduler.

use anyhow::{Context, Result};
use clap::Parser;
use leaky_bucket_server::{
    config::{DatabaseUrl, ServerConfig},
    logging::{self, AppLogger},
    server::Server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "leaky-bucket-server")]
#[command(about = "Leaky Bucket - multi-tenant token issuance server")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`sqlite:path` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,

    /// Disable the background refill scheduler
    #[arg(long)]
    no_refill: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database.url =
            DatabaseUrl::parse_url(url).context("Invalid --database-url value")?;
    }
    if args.no_refill {
        config.refill.enabled = false;
    }

    logging::init_from_env()?;

    info!("Starting Leaky Bucket Server");
    info!("{}", config.summary());

    if config.environment.is_production() && config.auth.jwt_secret_generated {
        AppLogger::log_security_event(
            "ephemeral_jwt_secret",
            "high",
            "JWT_SECRET_KEY is unset in production; sessions are invalidated on restart",
            None,
        );
    }

    let server = Server::from_config(config).await?;

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
