//! Adapter for the legacy chain client.
//!
//! The legacy chain is gas-free: sends carry a zero gas price, a fixed gas
//! limit and no value. Its client only broadcasts, so receipts are polled
//! with backoff until the configured deadline.

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::blockchain::transaction::{wait_for_receipt, RawTransaction, ReceiptPolling};
use crate::blockchain::{LegacyRpc, SigningIdentity, Wallet};
use crate::config::InteractionConfig;
use crate::nonce::NonceManager;
use crate::provider::factory::AdapterContext;
use crate::provider::{Action, DispatchResult, ProviderAdapter, RawOutcome};

pub struct LegacyAdapter {
    config: Arc<InteractionConfig>,
    rpc: Arc<dyn LegacyRpc>,
    nonces: Arc<NonceManager>,
    gas_limit: u64,
    polling: ReceiptPolling,
    chain_id: OnceCell<u64>,
}

impl LegacyAdapter {
    pub fn new(ctx: AdapterContext) -> DispatchResult<Self> {
        let rpc = ctx.connector.legacy(&ctx.config)?;
        Ok(Self::with_rpc(ctx, rpc))
    }

    pub fn with_rpc(ctx: AdapterContext, rpc: Arc<dyn LegacyRpc>) -> Self {
        Self {
            chain_id: OnceCell::new_with(ctx.config.chain_id),
            gas_limit: ctx.transactions.legacy_gas_limit,
            polling: ReceiptPolling::from(&ctx.transactions),
            config: ctx.config,
            rpc,
            nonces: ctx.nonces,
        }
    }

    async fn chain_id(&self) -> DispatchResult<u64> {
        let id = self.chain_id.get_or_try_init(|| self.rpc.chain_id()).await?;
        Ok(*id)
    }

    async fn send(&self, to: Address, identity: &SigningIdentity, data: Bytes) -> DispatchResult<RawOutcome> {
        let wallet = Wallet::from_identity(identity)?;
        let from = wallet.address();

        let mut guard = self.nonces.lock(from).await?;
        let on_chain = self.rpc.get_transaction_count(from).await?;
        let nonce = guard.reconcile(on_chain)?;
        let chain_id = self.chain_id().await?;

        let signed = wallet.sign_transaction(RawTransaction {
            to,
            nonce,
            gas_price: 0,
            gas_limit: self.gas_limit,
            value: U256::ZERO,
            data,
            chain_id,
        })?;

        tracing::info!(from = %from, to = %to, nonce, tx_hash = %signed.hash, "Broadcasting legacy transaction");

        let tx_hash = self.rpc.send_raw_transaction(signed.raw).await?;
        if tx_hash != signed.hash {
            tracing::warn!(expected = %signed.hash, reported = %tx_hash, "Node reported a different transaction hash");
        }

        let receipt = wait_for_receipt(self.rpc.as_ref(), tx_hash, self.polling).await?;
        if !receipt.status {
            tracing::warn!(tx_hash = %tx_hash, "Transaction reverted");
        }

        // Mined, even if reverted: the nonce is spent and the receipt is the
        // outcome, whether or not the new value reaches storage.
        if let Err(e) = guard.commit(nonce).await {
            tracing::error!(signer = %from, nonce, error = %e, "Failed to persist advanced nonce");
        }
        Ok(RawOutcome::Receipt(receipt))
    }
}

#[async_trait]
impl ProviderAdapter for LegacyAdapter {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn config(&self) -> &InteractionConfig {
        &self.config
    }

    async fn execute(
        &self,
        to: Address,
        from: Address,
        identity: &SigningIdentity,
        action: Action,
        data: Bytes,
    ) -> DispatchResult<RawOutcome> {
        match action {
            Action::Call => Ok(RawOutcome::Data(self.rpc.call(from, to, data).await?)),
            Action::Send => self.send(to, identity, data).await,
        }
    }
}
