//! Chain module: provider client, wallet session, and the contract handle

pub mod contract;
pub mod provider;

pub use contract::{AudioUploadedEvent, ContractClient, FeedError, PublishError, TxHandle};
pub use provider::{ProviderClient, WalletSession};
