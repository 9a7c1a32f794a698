//! Configuration management for voicecast
//!
//! Loads settings from environment variables (.env file)

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application client id, sent with every provider and storage request
    pub client_id: String,
    /// Address of the deployed audio contract
    pub contract_address: String,
    /// Wallet account address, bound by the `connect` command
    pub wallet_address: Option<String>,
    /// Wallet/contract provider base URL
    pub provider_url: String,
    /// Storage network base URL
    pub storage_url: String,
    /// Chain the contract is deployed on
    pub chain_id: u64,
    /// Feed poll interval in seconds
    pub feed_poll_secs: u64,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let client_id = env::var("CLIENT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("CLIENT_ID".to_string()))?;

        let contract_address = env::var("CONTRACT_ADDRESS")
            .map_err(|_| ConfigError::MissingEnvVar("CONTRACT_ADDRESS".to_string()))?;

        let wallet_address = env::var("WALLET_ADDRESS")
            .ok()
            .filter(|s| !s.is_empty());

        let provider_url = env::var("PROVIDER_URL")
            .unwrap_or_else(|_| networks::DEFAULT_PROVIDER_URL.to_string());

        let storage_url = env::var("STORAGE_URL")
            .unwrap_or_else(|_| networks::DEFAULT_STORAGE_URL.to_string());

        let chain_id = env::var("CHAIN_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue("CHAIN_ID".to_string(), s))
            })
            .transpose()?
            .unwrap_or(networks::POLYGON_AMOY);

        let feed_poll_secs = env::var("FEED_POLL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let sample_rate = env::var("SAMPLE_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16000);

        Ok(Self {
            client_id,
            contract_address,
            wallet_address,
            provider_url,
            storage_url,
            chain_id,
            feed_poll_secs,
            sample_rate,
        })
    }
}

/// Network identifiers and default hosts
pub mod networks {
    pub const POLYGON_AMOY: u64 = 80002;
    pub const DEFAULT_PROVIDER_URL: &str = "https://gateway.voicecast.xyz";
    pub const DEFAULT_STORAGE_URL: &str = "https://storage.voicecast.xyz";
}
