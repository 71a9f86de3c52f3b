//! Raw transaction construction and receipt polling.
//!
//! # Responsibilities
//! - Describe the fixed-shape transaction both adapters sign
//! - Poll the legacy surface for a receipt with backoff and a deadline

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::blockchain::rpc::LegacyRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxReceipt};
use crate::config::TransactionConfig;
use crate::resilience::backoff::calculate_backoff;

/// Wei per gwei.
pub const GWEI: u128 = 1_000_000_000;

/// An unsigned contract call transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub to: Address,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

impl RawTransaction {
    pub(crate) fn into_legacy(self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.data,
        }
    }
}

/// A signed, encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub nonce: u64,
    pub raw: Bytes,
}

/// Receipt polling bounds.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolling {
    pub timeout: Duration,
    pub base_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl From<&TransactionConfig> for ReceiptPolling {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.receipt_timeout_secs),
            base_interval_ms: config.receipt_poll_interval_ms,
            max_interval_ms: config.receipt_poll_max_interval_ms,
        }
    }
}

/// Poll `rpc` until `tx_hash` has a receipt or the deadline passes.
pub async fn wait_for_receipt(
    rpc: &dyn LegacyRpc,
    tx_hash: TxHash,
    polling: ReceiptPolling,
) -> BlockchainResult<TxReceipt> {
    let deadline = Instant::now() + polling.timeout;
    let mut attempt = 0u32;

    loop {
        if let Some(receipt) = rpc.get_transaction_receipt(tx_hash).await? {
            return Ok(receipt);
        }

        attempt = attempt.saturating_add(1);
        let delay = calculate_backoff(attempt, polling.base_interval_ms, polling.max_interval_ms);
        if Instant::now() + delay > deadline {
            return Err(BlockchainError::ReceiptTimeout {
                tx_hash,
                secs: polling.timeout.as_secs(),
            });
        }

        tracing::debug!(tx_hash = %tx_hash, attempt, delay_ms = delay.as_millis() as u64, "Transaction pending");
        sleep(delay).await;
    }
}
