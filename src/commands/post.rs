//! Post command: upload the finalized clip and commit it on-chain
//!
//! Each stage strictly waits for the prior stage's success; a failure halts
//! the run and the user records again

use crate::audio::Recorder;
use crate::chain::{ContractClient, PublishError, WalletSession};
use crate::storage::StorageClient;
use tracing::{error, info};

/// Handle `post`: take clip -> upload -> publish
pub async fn handle_post(
    recorder: &mut Recorder,
    storage: &StorageClient,
    contract: Option<&ContractClient>,
    wallet: Option<&WalletSession>,
) {
    // Preconditions are checked before the clip is consumed, so a missing
    // wallet does not cost the user their recording
    let Some(wallet) = wallet else {
        println!("Cannot post: {}", PublishError::NoWallet);
        return;
    };
    let Some(contract) = contract else {
        println!("Cannot post: {}", PublishError::NoContract);
        return;
    };
    let Some(clip) = recorder.take_clip() else {
        println!("No clip to post. `record` something first.");
        return;
    };

    println!("Uploading {}s clip...", clip.duration_secs);
    let reference = match storage.upload(&clip).await {
        Ok(reference) => reference,
        Err(e) => {
            error!("Upload stage failed: {}", e);
            println!("Upload failed: {}. Record again to retry.", e);
            return;
        }
    };

    println!("Publishing {}...", reference.uri);
    match contract
        .set_audio(wallet, &reference.uri, clip.duration_secs)
        .await
    {
        Ok(tx) => {
            info!("Published clip as {}", tx.transaction_hash);
            println!("Posted! tx {}", tx.transaction_hash);
        }
        Err(e) => {
            error!("Publish stage failed: {}", e);
            println!("Publish failed: {}. Record again to retry.", e);
        }
    }
}
