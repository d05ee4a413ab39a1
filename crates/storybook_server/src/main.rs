//! `storybook-server`: HTTP API, persistence and provider proxy.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storybook_database::{establish_pool, run_pool_migrations};
use storybook_server::{ServerConfig, StorageBackend, build_state, init_logging, serve};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Storybook generation server", long_about = None)]
struct Args {
    /// Configuration file (default: ./storybook.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// PostgreSQL URL (overrides configuration and DATABASE_URL)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address, e.g. 0.0.0.0:3000
        #[arg(short, long)]
        bind: Option<String>,

        /// Keep books in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config = config.with_database_url(url);
    }
    if args.json_logs {
        config = config.with_json_logs(true);
    }
    init_logging(config.logging())?;

    match args.command.unwrap_or(Command::Serve {
        bind: None,
        in_memory: false,
    }) {
        Command::Serve { bind, in_memory } => {
            if let Some(bind) = bind {
                config = config.with_bind_address(bind);
            }
            let backend = if in_memory {
                StorageBackend::InMemory
            } else {
                StorageBackend::Postgres
            };
            info!(?backend, bind_address = %config.bind_address(), "Starting Storybook server");
            let state = build_state(&config, backend).await?;
            serve(&config, state).await?;
        }
        Command::Migrate => {
            let url = config
                .database_url()
                .clone()
                .context("DATABASE_URL is not configured")?;
            let pool = establish_pool(&url, 1)?;
            run_pool_migrations(&pool)?;
            info!("Migrations applied");
        }
    }

    Ok(())
}
