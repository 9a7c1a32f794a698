//! Deployed audio contract handle
//!
//! One fixed address, a state-changing setAudio entry point, and the
//! AudioUploaded event query, all through the provider API

use crate::chain::provider::{ProviderClient, WalletSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Contract entry point written by the publish pipeline
pub const SET_AUDIO: &str = "setAudio";
/// Event type the feed subscribes to
pub const AUDIO_UPLOADED: &str = "AudioUploaded";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("No wallet connected")]
    NoWallet,
    #[error("Contract handle unavailable")]
    NoContract,
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Event query failed: {0}")]
    Query(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Write request submitted to the provider
#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    function: &'a str,
    args: (&'a str, u32),
    from: &'a str,
}

/// An accepted transaction; submission only, confirmation is not tracked
#[derive(Debug, Deserialize)]
pub struct TxHandle {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct EventPage {
    events: Vec<AudioUploadedEvent>,
}

/// AudioUploaded event payload, as emitted by the contract
#[derive(Debug, Clone, Deserialize)]
pub struct AudioUploadedEvent {
    pub user: String,
    #[serde(rename = "audioHash")]
    pub audio_hash: String,
    pub duration: u64,
    pub timestamp: i64,
}

/// Handle bound to the deployed contract
pub struct ContractClient {
    provider: Arc<ProviderClient>,
    address: String,
}

impl ContractClient {
    /// Bind the deployed contract; the address must be 0x-prefixed hex
    pub fn new(provider: Arc<ProviderClient>, address: String) -> Result<Self, PublishError> {
        if !is_address(&address) {
            return Err(PublishError::NoContract);
        }
        Ok(Self { provider, address })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/contract/{}/{}/{}",
            self.provider.base_url, self.provider.chain_id, self.address, suffix
        )
    }

    /// Submit the setAudio(uri, duration) transaction
    ///
    /// Returns as soon as the provider accepts the submission. Rejection
    /// covers user cancellation, insufficient funds, and chain errors.
    pub async fn set_audio(
        &self,
        wallet: &WalletSession,
        uri: &str,
        duration_secs: u32,
    ) -> Result<TxHandle, PublishError> {
        let request = WriteRequest {
            function: SET_AUDIO,
            args: (uri, duration_secs),
            from: &wallet.address,
        };

        let response = self
            .provider
            .http
            .post(self.endpoint("write"))
            .header("x-client-id", &self.provider.client_id)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Write rejected: {} - {}", status, text);
            return Err(PublishError::Rejected(format!("{}: {}", status, text)));
        }

        let tx: TxHandle = response.json().await?;
        info!("Submitted {} as tx {}", SET_AUDIO, tx.transaction_hash);
        Ok(tx)
    }

    /// Fetch AudioUploaded events from the given cursor, in chain order
    pub async fn events_since(&self, start: usize) -> Result<Vec<AudioUploadedEvent>, FeedError> {
        let response = self
            .provider
            .http
            .get(self.endpoint(&format!("events/{}", AUDIO_UPLOADED)))
            .query(&[("start", start)])
            .header("x-client-id", &self.provider.client_id)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FeedError::Query(format!("{}: {}", status, text)));
        }

        let page: EventPage = response.json().await?;
        Ok(page.events)
    }
}

/// Rough shape check for a hex account/contract address
fn is_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_request_wire_shape() {
        let request = WriteRequest {
            function: SET_AUDIO,
            args: ("ipfs://Qm123", 3),
            from: "0x00112233445566778899aabbccddeeff00112233",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""function":"setAudio""#));
        assert!(json.contains(r#""args":["ipfs://Qm123",3]"#));
        assert!(json.contains(r#""from":"0x00112233445566778899aabbccddeeff00112233""#));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{
            "user": "0x00112233445566778899aabbccddeeff00112233",
            "audioHash": "ipfs://Qm123",
            "duration": 3,
            "timestamp": 1722790000
        }"#;

        let event: AudioUploadedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.user, "0x00112233445566778899aabbccddeeff00112233");
        assert_eq!(event.audio_hash, "ipfs://Qm123");
        assert_eq!(event.duration, 3);
        assert_eq!(event.timestamp, 1722790000);
    }

    #[test]
    fn test_tx_handle_deserialization() {
        let tx: TxHandle =
            serde_json::from_str(r#"{"transactionHash":"0xdeadbeef"}"#).unwrap();
        assert_eq!(tx.transaction_hash, "0xdeadbeef");
    }

    #[test]
    fn test_address_shape_check() {
        assert!(is_address("0x00112233445566778899aabbccddeeff00112233"));
        assert!(!is_address("00112233445566778899aabbccddeeff00112233"));
        assert!(!is_address("0x1234"));
        assert!(!is_address("0x00112233445566778899aabbccddeeff0011223g"));
    }
}
