//! Chain-specific types and error definitions.

use alloy::primitives::{Bytes, TxHash, B256};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node answered with a JSON-RPC error, e.g. a revert.
    #[error("{operation} rejected by node: {source}")]
    Node {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// RPC request timed out.
    #[error("RPC timeout after {secs} seconds during {operation}")]
    Timeout { operation: &'static str, secs: u64 },

    /// No receipt showed up for a broadcast transaction in time.
    #[error("No receipt for transaction {tx_hash} after {secs} seconds")]
    ReceiptTimeout { tx_hash: TxHash, secs: u64 },

    /// Invalid private key format or a key/address mismatch.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Transaction signing failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl BlockchainError {
    /// Whether this error is a deadline expiry rather than a failed round trip.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BlockchainError::Timeout { .. } | BlockchainError::ReceiptTimeout { .. }
        )
    }

    /// Revert data carried by a node rejection, if any.
    pub fn revert_data(&self) -> Option<Bytes> {
        match self {
            BlockchainError::Node { source, .. } => source.as_error_resp().and_then(|e| e.as_revert_data()),
            _ => None,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// The subset of a mined transaction's receipt the dispatch layer reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: B256,
    /// Block the transaction was included in, if reported.
    pub block_number: Option<u64>,
    /// Gas consumed by execution.
    pub gas_used: u64,
    /// `true` on success, `false` when execution reverted.
    pub status: bool,
}

impl From<&TransactionReceipt> for TxReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            status: receipt.status(),
        }
    }
}

impl From<TransactionReceipt> for TxReceipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self::from(&receipt)
    }
}
