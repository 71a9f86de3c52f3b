//! Provider adapters: the seam between interaction facades and a chain.
//!
//! # Responsibilities
//! - Resolve a contract role to its address and ABI
//! - Validate a dispatch request before any network I/O
//! - Route `call` to a read-only invocation and `send` to a signed,
//!   nonce-sequenced transaction
//!
//! # Data Flow
//! ```text
//! ProviderFactory::create(variant)
//!     → ProviderAdapter::resolve_methods(role)     (MethodTable)
//!     → ProviderAdapter::dispatch(table, identity, action, params)
//!         validate → encode → execute → decode
//! ```
//!
//! # Design Decisions
//! - Adapters only implement `execute`, the raw round trip; validation,
//!   encoding and metrics are shared
//! - Failures are typed errors, never sentinel values

pub mod factory;
pub mod legacy;
pub mod standard;
pub mod types;

pub use factory::{AdapterConstructor, AdapterContext, ProviderFactory};
pub use legacy::LegacyAdapter;
pub use standard::StandardAdapter;
pub use types::{
    require_non_empty, Action, ContractAction, ContractRole, DispatchError, DispatchOutcome, DispatchResult,
    MethodTable, RawOutcome,
};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::time::Instant;

use crate::blockchain::{SigningIdentity, TxReceipt};
use crate::config::InteractionConfig;
use crate::observability::metrics;

/// A chain client able to serve contract calls and sends.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Configuration snapshot this adapter was created with.
    fn config(&self) -> &InteractionConfig;

    /// Resolve `role` (case-insensitive) to its callable surface.
    fn resolve_methods(&self, role: &str) -> DispatchResult<MethodTable> {
        MethodTable::resolve(self.config(), role)
    }

    /// Perform one round trip with already-encoded call data.
    ///
    /// `from` has been validated against `identity.address`.
    async fn execute(
        &self,
        to: Address,
        from: Address,
        identity: &SigningIdentity,
        action: Action,
        data: Bytes,
    ) -> DispatchResult<RawOutcome>;

    /// Validate, encode and execute `action` against `table`.
    async fn dispatch(
        &self,
        table: &MethodTable,
        identity: &SigningIdentity,
        action: &ContractAction,
        params: &[DynSolValue],
    ) -> DispatchResult<DispatchOutcome> {
        let method = require_non_empty("method name", &action.method)?;
        let from = validate_identity(identity, action.action)?;
        let data = table.encode(method, params)?;

        match run(self, table, from, identity, action.action, method, data).await? {
            RawOutcome::Data(bytes) => Ok(DispatchOutcome::Value(table.decode(method, params.len(), &bytes)?)),
            RawOutcome::Receipt(receipt) => Ok(DispatchOutcome::Receipt(receipt)),
        }
    }
}

impl dyn ProviderAdapter {
    /// Read-only call with a compile-time binding.
    pub async fn call_typed<C: SolCall + Sync>(
        &self,
        table: &MethodTable,
        identity: &SigningIdentity,
        call: &C,
    ) -> DispatchResult<C::Return> {
        let from = validate_identity(identity, Action::Call)?;
        let data = Bytes::from(call.abi_encode());

        match run(self, table, from, identity, Action::Call, C::SIGNATURE, data).await? {
            RawOutcome::Data(bytes) => C::abi_decode_returns(&bytes).map_err(|e| DispatchError::Abi {
                method: C::SIGNATURE.to_string(),
                message: e.to_string(),
            }),
            RawOutcome::Receipt(_) => Err(DispatchError::UnexpectedOutcome("return values")),
        }
    }

    /// Signed send with a compile-time binding.
    pub async fn send_typed<C: SolCall + Sync>(
        &self,
        table: &MethodTable,
        identity: &SigningIdentity,
        call: &C,
    ) -> DispatchResult<TxReceipt> {
        let from = validate_identity(identity, Action::Send)?;
        let data = Bytes::from(call.abi_encode());

        match run(self, table, from, identity, Action::Send, C::SIGNATURE, data).await? {
            RawOutcome::Receipt(receipt) => Ok(receipt),
            RawOutcome::Data(_) => Err(DispatchError::UnexpectedOutcome("a receipt")),
        }
    }
}

/// Check the caller's identity; sends also need a key.
fn validate_identity(identity: &SigningIdentity, action: Action) -> DispatchResult<Address> {
    let raw = require_non_empty("signer address", &identity.address)?;
    let from = raw
        .parse()
        .map_err(|e| DispatchError::Validation(format!("signer address '{raw}' is invalid: {e}")))?;
    if action == Action::Send {
        require_non_empty("private key", &identity.private_key)?;
    }
    Ok(from)
}

async fn run<A: ProviderAdapter + ?Sized>(
    adapter: &A,
    table: &MethodTable,
    from: Address,
    identity: &SigningIdentity,
    action: Action,
    method: &str,
    data: Bytes,
) -> DispatchResult<RawOutcome> {
    let role = table.role().as_str();
    let started = Instant::now();
    tracing::debug!(
        adapter = adapter.name(),
        role,
        method,
        action = action.as_str(),
        from = %from,
        "Dispatching contract interaction"
    );

    let result = adapter.execute(table.address(), from, identity, action, data).await;
    let elapsed = started.elapsed();
    metrics::record_dispatch(role, action.as_str(), result.is_ok(), elapsed);

    match &result {
        Ok(_) => tracing::info!(
            adapter = adapter.name(),
            role,
            method,
            action = action.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Contract interaction completed"
        ),
        Err(e) => tracing::warn!(
            adapter = adapter.name(),
            role,
            method,
            action = action.as_str(),
            error = %e,
            "Contract interaction failed"
        ),
    }
    result
}
