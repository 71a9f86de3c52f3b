//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! SigningIdentity (address + private key, per dispatch)
//!     → wallet.rs (key check, EIP-155 signing)
//!     → transaction.rs (raw transaction shape, receipt polling)
//!     → rpc.rs (StandardRpc / LegacyRpc surfaces)
//!     → client.rs (HTTP providers with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Private keys are supplied per call and never stored
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use rpc::{HttpConnector, LegacyRpc, RpcConnector, StandardRpc};
pub use transaction::{RawTransaction, ReceiptPolling, SignedTransaction, GWEI};
pub use types::{BlockchainError, BlockchainResult, TxReceipt};
pub use wallet::{SigningIdentity, Wallet};
