//! Interactive shell composing the recorder, publish pipeline, and feed

use crate::audio::Recorder;
use crate::chain::{ContractClient, ProviderClient, WalletSession};
use crate::commands;
use crate::config::Config;
use crate::feed::{FeedReader, FeedState};
use crate::storage::StorageClient;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

/// Shell state shared across command handlers
pub struct App {
    config: Arc<Config>,
    recorder: Recorder,
    storage: StorageClient,
    contract: Option<Arc<ContractClient>>,
    wallet: Option<WalletSession>,
    feed: watch::Receiver<FeedState>,
}

/// Wire up every component and run the command loop until quit or EOF
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(config);

    let provider = Arc::new(ProviderClient::new(
        config.provider_url.clone(),
        config.client_id.clone(),
        config.chain_id,
    ));

    let contract = match ContractClient::new(provider.clone(), config.contract_address.clone()) {
        Ok(contract) => Some(Arc::new(contract)),
        Err(e) => {
            warn!(
                "Contract address {} is not usable: {}",
                config.contract_address, e
            );
            None
        }
    };

    let storage = StorageClient::new(config.storage_url.clone(), config.client_id.clone());

    // The feed subscription lives for the whole session, independent of the
    // publish pipeline
    let feed = match &contract {
        Some(contract) => {
            FeedReader::new(contract.clone(), Duration::from_secs(config.feed_poll_secs))
                .subscribe()
        }
        None => watch::channel(FeedState::Error("contract handle unavailable".to_string())).1,
    };

    let mut app = App {
        recorder: Recorder::new(config.sample_rate),
        storage,
        contract,
        wallet: None,
        feed,
        config,
    };

    println!("voicecast - record, post, and listen to on-chain audio clips");
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "record" => commands::record::handle_record(&mut app.recorder),
            "stop" => commands::record::handle_stop(&mut app.recorder),
            "post" => {
                commands::post::handle_post(
                    &mut app.recorder,
                    &app.storage,
                    app.contract.as_deref(),
                    app.wallet.as_ref(),
                )
                .await
            }
            "feed" => commands::feed::handle_feed(&app.feed),
            "connect" => app.connect(),
            "status" => commands::record::handle_status(&app.recorder, app.wallet.as_ref()),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("Unknown command: {} (try `help`)", other),
        }
    }

    info!("Shutting down");
    app.recorder.stop();
    Ok(())
}

impl App {
    /// Bind the wallet session from configuration
    ///
    /// The provider does the actual signing; this only fixes which account
    /// the publish pipeline acts as.
    fn connect(&mut self) {
        if let Some(wallet) = &self.wallet {
            println!("Already connected as {}", wallet.address);
            return;
        }

        match self.config.wallet_address.clone() {
            Some(address) => {
                info!("Wallet session bound to {}", address);
                println!("Connected as {}", address);
                self.wallet = Some(WalletSession::new(address));
            }
            None => println!("Set WALLET_ADDRESS in the environment, then `connect` again."),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  record   start recording (60s max)");
    println!("  stop     stop recording and keep the clip");
    println!("  post     upload the clip and publish it on-chain");
    println!("  feed     show the audio feed");
    println!("  connect  bind the wallet session from WALLET_ADDRESS");
    println!("  status   show recorder and wallet state");
    println!("  quit     exit");
}
