//! Domain facades over a provider adapter.
//!
//! # Data Flow
//! ```text
//! ConsentInteraction::give_consent(identity, ...)
//!     → validate string arguments (non-empty after trimming)
//!     → adapter.resolve_methods("consent")
//!     → adapter.dispatch(table, identity, send("giveConsent"), params)
//!     → receipt status
//! ```
//!
//! # Design Decisions
//! - Each facade holds one adapter for its lifetime; a configuration change
//!   reaches it only when the facade is rebuilt from the factory
//! - Every argument travels as an ABI `string`

pub mod access;
pub mod consent;
pub mod file_management;

pub use access::AccessInteraction;
pub use consent::ConsentInteraction;
pub use file_management::FileManagementInteraction;

use alloy::dyn_abi::DynSolValue;
use std::sync::Arc;

use crate::blockchain::SigningIdentity;
use crate::provider::{
    require_non_empty, ContractAction, ContractRole, DispatchError, DispatchResult, ProviderAdapter,
};

/// An adapter bound to one contract role.
#[derive(Clone)]
pub(crate) struct RoleClient {
    adapter: Arc<dyn ProviderAdapter>,
    role: ContractRole,
}

impl RoleClient {
    pub(crate) fn new(adapter: Arc<dyn ProviderAdapter>, role: ContractRole) -> Self {
        Self { adapter, role }
    }

    /// Send `method` and report whether the mined transaction succeeded.
    pub(crate) async fn send(
        &self,
        identity: &SigningIdentity,
        method: &str,
        args: &[(&str, &str)],
    ) -> DispatchResult<bool> {
        let params = string_params(args)?;
        let table = self.adapter.resolve_methods(self.role.as_str())?;
        let receipt = self
            .adapter
            .dispatch(&table, identity, &ContractAction::send(method), &params)
            .await?
            .into_receipt()?;
        Ok(receipt.status)
    }

    /// Call `method` and return its single return value.
    pub(crate) async fn call(
        &self,
        identity: &SigningIdentity,
        method: &str,
        args: &[(&str, &str)],
    ) -> DispatchResult<DynSolValue> {
        let params = string_params(args)?;
        let table = self.adapter.resolve_methods(self.role.as_str())?;
        let mut values = self
            .adapter
            .dispatch(&table, identity, &ContractAction::call(method), &params)
            .await?
            .into_values()?;
        if values.len() != 1 {
            return Err(DispatchError::Abi {
                method: method.to_string(),
                message: format!("expected one return value, got {}", values.len()),
            });
        }
        Ok(values.remove(0))
    }
}

/// Blank arguments are rejected; the rest go on-chain exactly as given.
fn string_params(args: &[(&str, &str)]) -> DispatchResult<Vec<DynSolValue>> {
    args.iter()
        .map(|(field, value)| {
            require_non_empty(field, value)?;
            Ok(DynSolValue::String(value.to_string()))
        })
        .collect()
}

pub(crate) fn expect_bool(method: &str, value: DynSolValue) -> DispatchResult<bool> {
    value.as_bool().ok_or_else(|| DispatchError::Abi {
        method: method.to_string(),
        message: format!("expected bool, got {value:?}"),
    })
}

pub(crate) fn expect_string(method: &str, value: DynSolValue) -> DispatchResult<String> {
    match value {
        DynSolValue::String(s) => Ok(s),
        other => Err(DispatchError::Abi {
            method: method.to_string(),
            message: format!("expected string, got {other:?}"),
        }),
    }
}
