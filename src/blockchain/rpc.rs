//! The two RPC surfaces the adapters talk to.
//!
//! `StandardRpc` is the JSON-RPC surface the standard adapter drives: it can
//! estimate gas and hands back a receipt once a raw transaction is mined.
//! `LegacyRpc` is the narrower surface of the legacy client: transaction
//! count, raw broadcast and receipt lookup, with receipt polling left to the
//! caller.

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainResult, TxReceipt};
use crate::config::InteractionConfig;

/// JSON-RPC surface used by the standard adapter.
#[async_trait]
pub trait StandardRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> BlockchainResult<u64>;

    /// `eth_call`
    async fn call(&self, tx: TransactionRequest) -> BlockchainResult<Bytes>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, tx: TransactionRequest) -> BlockchainResult<u64>;

    /// `eth_getTransactionCount` at the pending block.
    async fn pending_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// `eth_sendRawTransaction`, then wait up to `receipt_timeout` for the receipt.
    async fn submit_raw_transaction(&self, raw: Bytes, receipt_timeout: Duration) -> BlockchainResult<TxReceipt>;
}

/// Surface of the legacy chain client.
#[async_trait]
pub trait LegacyRpc: Send + Sync {
    async fn chain_id(&self) -> BlockchainResult<u64>;

    /// Read-only invocation of `data` against `to` from `from`.
    async fn call(&self, from: Address, to: Address, data: Bytes) -> BlockchainResult<Bytes>;

    /// Pending transaction count for `address`.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash>;

    /// `None` while the transaction is not mined yet.
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>>;
}

/// Turns a configured endpoint into RPC surfaces.
pub trait RpcConnector: Send + Sync {
    fn standard(&self, config: &InteractionConfig) -> BlockchainResult<Arc<dyn StandardRpc>>;

    fn legacy(&self, config: &InteractionConfig) -> BlockchainResult<Arc<dyn LegacyRpc>>;
}

/// Connects over HTTP with `alloy` providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl RpcConnector for HttpConnector {
    fn standard(&self, config: &InteractionConfig) -> BlockchainResult<Arc<dyn StandardRpc>> {
        Ok(Arc::new(BlockchainClient::connect(config)?))
    }

    fn legacy(&self, config: &InteractionConfig) -> BlockchainResult<Arc<dyn LegacyRpc>> {
        Ok(Arc::new(BlockchainClient::connect(config)?))
    }
}
