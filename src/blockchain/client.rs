//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (chain id, transaction count, receipts)
//! - Run calls and gas estimation, broadcast raw transactions
//! - Bound every round trip with the configured timeout

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::rpc::{LegacyRpc, StandardRpc};
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxReceipt};
use crate::config::InteractionConfig;
use crate::resilience::timeouts::with_timeout;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Primary endpoint, for diagnostics.
    rpc_url: String,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a client for the configured endpoints.
    ///
    /// No request is made here; unreachable endpoints surface on first use.
    pub fn connect(config: &InteractionConfig) -> BlockchainResult<Self> {
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            timeout_secs = config.rpc_timeout.as_secs(),
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            rpc_url: config.rpc_url.clone(),
            timeout_duration: config.rpc_timeout,
        })
    }

    /// Run a read against each provider in turn until one answers.
    ///
    /// Only unreachable or slow endpoints are skipped. An error response from
    /// a node (a revert, say) is returned as is without asking the next one.
    /// Otherwise the error of the last provider is returned, so a timeout
    /// stays a timeout.
    async fn read<T, F, Fut>(&self, operation: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn(Arc<dyn Provider + Send + Sync>) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match with_timeout(operation, self.timeout_duration, f(Arc::clone(provider))).await {
                Ok(result) => return Ok(result),
                Err(e @ BlockchainError::Node { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(provider_idx = i, operation, error = %e, "RPC failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| BlockchainError::Rpc(format!("No providers for {operation}"))))
    }

    fn primary(&self) -> BlockchainResult<&Arc<dyn Provider + Send + Sync>> {
        self.providers
            .first()
            .ok_or_else(|| BlockchainError::Rpc("No RPC provider configured".to_string()))
    }

    async fn fetch_chain_id(&self) -> BlockchainResult<u64> {
        self.read("eth_chainId", |p| async move { p.get_chain_id().await }).await
    }

    async fn eth_call(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        self.read("eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    async fn pending_count(&self, address: Address) -> BlockchainResult<u64> {
        self.read("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Broadcasts go to the primary endpoint only.
    async fn broadcast(
        &self,
        raw: &Bytes,
    ) -> BlockchainResult<alloy::providers::PendingTransactionBuilder<alloy::network::Ethereum>> {
        let provider = self.primary()?;
        with_timeout(
            "eth_sendRawTransaction",
            self.timeout_duration,
            provider.send_raw_transaction(raw),
        )
        .await
    }
}

#[async_trait]
impl StandardRpc for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.fetch_chain_id().await
    }

    async fn call(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        self.eth_call(tx).await
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> BlockchainResult<u64> {
        self.read("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    async fn pending_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.pending_count(address).await
    }

    async fn submit_raw_transaction(&self, raw: Bytes, receipt_timeout: Duration) -> BlockchainResult<TxReceipt> {
        let pending = self.broadcast(&raw).await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "Transaction broadcast, waiting for receipt");

        match tokio::time::timeout(receipt_timeout, pending.get_receipt()).await {
            Ok(Ok(receipt)) => Ok(TxReceipt::from(receipt)),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("Receipt for {tx_hash} failed: {e}"))),
            Err(_) => Err(BlockchainError::ReceiptTimeout {
                tx_hash,
                secs: receipt_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl LegacyRpc for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.fetch_chain_id().await
    }

    async fn call(&self, from: Address, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);
        self.eth_call(tx).await
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.pending_count(address).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        let pending = self.broadcast(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>> {
        let receipt = self
            .read("eth_getTransactionReceipt", |p| async move {
                p.get_transaction_receipt(tx_hash).await
            })
            .await?;
        Ok(receipt.map(TxReceipt::from))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.rpc_url)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
