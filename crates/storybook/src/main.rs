//! Storybook CLI binary.
//!
//! This binary talks to a running Storybook server:
//! - Generate and illustrate new books
//! - List, show, redraw and delete saved books
//! - Manage brand, engine and key settings

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use cli::{Cli, Context, handle_command};

    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut ctx = Context::new(&cli.server, cli.settings_dir);
    handle_command(&mut ctx, cli.command).await?;

    Ok(())
}
