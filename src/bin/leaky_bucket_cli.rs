// ABOUTME: Operator CLI for the Leaky Bucket server
// ABOUTME: Runs one-off maintenance tasks such as a manual refill pass against the configured database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use leaky_bucket_server::{
    config::{DatabaseUrl, ServerConfig},
    database_plugins::{factory::Database, DatabaseProvider},
    logging,
    models::ListCompaniesOptions,
    tokens::RefillScheduler,
};

#[derive(Parser)]
#[command(name = "leaky-bucket-cli")]
#[command(about = "Maintenance commands for the Leaky Bucket server")]
struct Cli {
    /// Override database URL (`sqlite:path`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single replenishment pass and print its report as JSON
    Refill {
        /// Skip companies whose policy cooldown has not elapsed
        #[arg(long)]
        honor_cooldown: bool,
    },
    /// Print every company with its policy and users as JSON
    Companies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url.as_deref() {
        config.database.url =
            DatabaseUrl::parse_url(url).context("Invalid --database-url value")?;
    }

    let database = Database::new(&config.database.url.to_connection_string()).await?;

    match cli.command {
        Command::Refill { honor_cooldown } => {
            let mut refill = config.refill;
            refill.honor_policy_cooldown |= honor_cooldown;

            let outcome = RefillScheduler::new(database, refill)
                .run_once(Utc::now())
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Companies => {
            let companies = database
                .list_companies(ListCompaniesOptions::everything())
                .await?;
            println!("{}", serde_json::to_string_pretty(&companies)?);
        }
    }

    Ok(())
}
