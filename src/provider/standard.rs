//! Adapter for the standard JSON-RPC client.
//!
//! Sends are EIP-155 legacy transactions priced at the configured gas price
//! (30 gwei by default) with an estimated gas limit. The node hands back the
//! receipt once the transaction is mined.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::blockchain::transaction::{RawTransaction, GWEI};
use crate::blockchain::{SigningIdentity, StandardRpc, Wallet};
use crate::config::InteractionConfig;
use crate::nonce::NonceManager;
use crate::provider::factory::AdapterContext;
use crate::provider::{Action, DispatchResult, ProviderAdapter, RawOutcome};

pub struct StandardAdapter {
    config: Arc<InteractionConfig>,
    rpc: Arc<dyn StandardRpc>,
    nonces: Arc<NonceManager>,
    gas_price: u128,
    receipt_timeout: Duration,
    chain_id: OnceCell<u64>,
}

impl StandardAdapter {
    pub fn new(ctx: AdapterContext) -> DispatchResult<Self> {
        let rpc = ctx.connector.standard(&ctx.config)?;
        Ok(Self::with_rpc(ctx, rpc))
    }

    /// Build around an already connected RPC surface.
    pub fn with_rpc(ctx: AdapterContext, rpc: Arc<dyn StandardRpc>) -> Self {
        let chain_id = OnceCell::new_with(ctx.config.chain_id);
        Self {
            gas_price: u128::from(ctx.transactions.gas_price_gwei) * GWEI,
            receipt_timeout: Duration::from_secs(ctx.transactions.receipt_timeout_secs),
            config: ctx.config,
            rpc,
            nonces: ctx.nonces,
            chain_id,
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
        let on_chain = self.rpc.pending_transaction_count(from).await?;
        let nonce = guard.reconcile(on_chain)?;

        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_nonce(nonce)
            .with_gas_price(self.gas_price)
            .with_input(data.clone());
        let gas_limit = self.rpc.estimate_gas(request).await?;
        let chain_id = self.chain_id().await?;

        let signed = wallet.sign_transaction(RawTransaction {
            to,
            nonce,
            gas_price: self.gas_price,
            gas_limit,
            value: U256::ZERO,
            data,
            chain_id,
        })?;

        tracing::info!(
            from = %from,
            to = %to,
            nonce,
            gas_limit,
            tx_hash = %signed.hash,
            "Broadcasting transaction"
        );

        let receipt = self.rpc.submit_raw_transaction(signed.raw, self.receipt_timeout).await?;
        if !receipt.status {
            tracing::warn!(tx_hash = %receipt.transaction_hash, "Transaction reverted");
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
impl ProviderAdapter for StandardAdapter {
    fn name(&self) -> &'static str {
        "standard"
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
            Action::Call => {
                let request = TransactionRequest::default().with_from(from).with_to(to).with_input(data);
                Ok(RawOutcome::Data(self.rpc.call(request).await?))
            }
            Action::Send => self.send(to, identity, data).await,
        }
    }
}
