//! Storage network uploader
//!
//! Pushes finalized clips to the content-addressed storage network and
//! returns an ipfs:// reference for the publish stage

use crate::audio::AudioClip;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Nothing to upload: the clip is empty")]
    EmptyClip,
}

/// Reference to uploaded content, passed through to the publish stage
#[derive(Debug, Clone)]
pub struct ContentReference {
    pub uri: String,
}

/// Response from the storage upload endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Storage network client
pub struct StorageClient {
    client: Client,
    base_url: String,
    client_id: String,
}

impl StorageClient {
    pub fn new(base_url: String, client_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            client_id,
        }
    }

    /// Upload a finalized clip as a named file; a single attempt, no retry
    pub async fn upload(&self, clip: &AudioClip) -> Result<ContentReference, UploadError> {
        if clip.is_empty() {
            return Err(UploadError::EmptyClip);
        }

        let url = format!("{}/ipfs/upload", self.base_url);

        let part = multipart::Part::bytes(clip.bytes.clone())
            .file_name("audio.wav")
            .mime_str(clip.mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header("x-client-id", &self.client_id)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Upload failed: {} - {}", status, text);
            return Err(UploadError::Rejected(format!("{}: {}", status, text)));
        }

        let upload: UploadResponse = response.json().await?;
        let reference = ContentReference {
            uri: ipfs_uri(&upload.ipfs_hash),
        };
        info!("Uploaded {} bytes as {}", clip.bytes.len(), reference.uri);
        Ok(reference)
    }
}

/// Normalize a raw content hash into an ipfs:// URI
fn ipfs_uri(hash: &str) -> String {
    if hash.starts_with("ipfs://") {
        hash.to_string()
    } else {
        format!("ipfs://{}", hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_normalized_to_uri() {
        assert_eq!(ipfs_uri("Qm123"), "ipfs://Qm123");
        assert_eq!(ipfs_uri("ipfs://Qm123"), "ipfs://Qm123");
    }

    #[test]
    fn test_upload_response_field_names() {
        let resp: UploadResponse = serde_json::from_str(r#"{"IpfsHash":"Qm123"}"#).unwrap();
        assert_eq!(resp.ipfs_hash, "Qm123");
    }
}
