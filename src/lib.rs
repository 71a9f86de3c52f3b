//! Smart-contract call/send dispatch library

pub mod blockchain;
pub mod cache;
pub mod config;
pub mod interaction;
pub mod nonce;
pub mod observability;
pub mod provider;
pub mod resilience;

pub use blockchain::{SigningIdentity, TxReceipt};
pub use config::{DispatchConfig, InteractionConfig};
pub use interaction::{AccessInteraction, ConsentInteraction, FileManagementInteraction};
pub use provider::{ContractAction, DispatchError, DispatchOutcome, DispatchResult, ProviderAdapter, ProviderFactory};
