//! Wallet/contract provider client
//!
//! The provider owns keys and signing; this client only talks to its HTTP
//! API, authenticated per request with the application client id

use reqwest::Client;
use std::time::Duration;

/// Immutable provider context shared by the publish and feed paths
///
/// Constructed once at startup and never mutated afterwards.
pub struct ProviderClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) client_id: String,
    pub(crate) chain_id: u64,
}

impl ProviderClient {
    pub fn new(base_url: String, client_id: String, chain_id: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            client_id,
            chain_id,
        }
    }
}

/// A connected wallet account
///
/// The provider manages the keys; publishing only ever reads the address.
#[derive(Debug, Clone)]
pub struct WalletSession {
    pub address: String,
}

impl WalletSession {
    pub fn new(address: String) -> Self {
        Self { address }
    }
}
