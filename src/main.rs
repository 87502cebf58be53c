#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ghostpost::Cli;
use ghostpost::app::dispatch::{dispatch, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so drafts on stdout stay pipeable.
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }

    let config = load_config(cli.config.clone())?;
    dispatch(cli, Arc::new(config)).await
}
