//! voicecast - terminal client for an on-chain social audio feed
//!
//! Records capped voice clips, uploads them to content-addressed storage,
//! and commits the references to the audio contract; renders the feed of
//! AudioUploaded events.

mod app;
mod audio;
mod chain;
mod commands;
mod config;
mod feed;
mod storage;

use config::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,voicecast=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("voicecast starting...");

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure CLIENT_ID and CONTRACT_ADDRESS are set in .env file");
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");
    info!(
        "Chain {} contract {}",
        config.chain_id, config.contract_address
    );

    // Run the shell
    if let Err(e) = app::run(config).await {
        error!("Shell error: {}", e);
        std::process::exit(1);
    }
}
