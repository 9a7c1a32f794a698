//! Live feed of posted clips
//!
//! Polls the contract's AudioUploaded events in the background and projects
//! each one into a renderable item

use crate::chain::{AudioUploadedEvent, ContractClient};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Public gateway used to turn content hashes into playable URLs
pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs";

/// Observable state of the subscription
#[derive(Debug, Clone)]
pub enum FeedState {
    /// Nothing fetched yet
    Loading,
    /// Subscription failed; shown in place of the feed, never retried
    Error(String),
    /// Every event emitted so far, in chain order
    Ready(Vec<FeedItem>),
}

/// Renderable projection of one AudioUploaded event
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub user: String,
    pub media_url: String,
    pub duration_secs: u64,
    pub posted_at: DateTime<Local>,
}

impl FeedItem {
    /// Project an on-chain event; identical input yields identical output
    pub fn from_event(event: &AudioUploadedEvent) -> Self {
        Self {
            user: event.user.clone(),
            media_url: media_url(&event.audio_hash),
            duration_secs: event.duration,
            posted_at: local_timestamp(event.timestamp),
        }
    }

    /// Truncated form of the poster address, derived from the full one
    pub fn short_user(&self) -> String {
        short_address(&self.user)
    }
}

/// first3...last4 of an address; inputs too short to truncate pass through
pub fn short_address(address: &str) -> String {
    if address.len() <= 7 {
        return address.to_string();
    }
    format!("{}...{}", &address[..3], &address[address.len() - 4..])
}

/// Resolve a stored content hash against the public gateway
pub fn media_url(audio_hash: &str) -> String {
    let hash = audio_hash.strip_prefix("ipfs://").unwrap_or(audio_hash);
    format!("{}/{}", IPFS_GATEWAY, hash)
}

/// Event timestamps are seconds since epoch, rendered in viewer-local time
fn local_timestamp(secs: i64) -> DateTime<Local> {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Background subscription to the contract's event stream
pub struct FeedReader {
    contract: Arc<ContractClient>,
    poll_interval: Duration,
}

impl FeedReader {
    pub fn new(contract: Arc<ContractClient>, poll_interval: Duration) -> Self {
        Self {
            contract,
            poll_interval,
        }
    }

    /// Spawn the polling task and return the state channel
    ///
    /// Each new event is appended exactly once, in chain order; the cursor
    /// only ever advances by the number of events returned. A query failure
    /// surfaces as FeedState::Error and ends the subscription.
    pub fn subscribe(self) -> watch::Receiver<FeedState> {
        let (tx, rx) = watch::channel(FeedState::Loading);

        tokio::spawn(async move {
            let mut items: Vec<FeedItem> = Vec::new();
            let mut cursor = 0usize;
            let mut interval = tokio::time::interval(self.poll_interval);

            loop {
                interval.tick().await;

                match self.contract.events_since(cursor).await {
                    Ok(events) => {
                        cursor += events.len();
                        let first_fetch = matches!(*tx.borrow(), FeedState::Loading);
                        if events.is_empty() && !first_fetch {
                            continue;
                        }
                        items.extend(events.iter().map(FeedItem::from_event));
                        if tx.send(FeedState::Ready(items.clone())).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Feed subscription failed: {}", e);
                        let _ = tx.send(FeedState::Error(e.to_string()));
                        break;
                    }
                }
            }
            info!("Feed subscription ended");
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> AudioUploadedEvent {
        AudioUploadedEvent {
            user: "0x00112233445566778899aabbccddeeff00112233".to_string(),
            audio_hash: "ipfs://Qmabc123".to_string(),
            duration: 3,
            timestamp: 1722790000,
        }
    }

    #[test]
    fn test_media_url_strips_scheme() {
        assert_eq!(media_url("ipfs://Qmabc123"), "https://ipfs.io/ipfs/Qmabc123");
        assert_eq!(media_url("Qmabc123"), "https://ipfs.io/ipfs/Qmabc123");
    }

    #[test]
    fn test_address_truncation() {
        assert_eq!(
            short_address("0x00112233445566778899aabbccddeeff00112233"),
            "0x0...2233"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_both_address_forms_come_from_one_raw_value() {
        let item = FeedItem::from_event(&event());
        assert_eq!(item.user, "0x00112233445566778899aabbccddeeff00112233");
        assert_eq!(item.short_user(), "0x0...2233");
    }

    #[test]
    fn test_projection_is_deterministic() {
        let source = event();
        assert_eq!(FeedItem::from_event(&source), FeedItem::from_event(&source));
    }

    #[test]
    fn test_posted_clip_projection() {
        // A 3s clip uploaded as ipfs://Qmabc123 streams from the gateway
        let item = FeedItem::from_event(&event());
        assert_eq!(item.media_url, "https://ipfs.io/ipfs/Qmabc123");
        assert_eq!(item.duration_secs, 3);
    }
}
