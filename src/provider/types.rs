//! Dispatch data model and error definitions.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, TxReceipt};
use crate::cache::CacheError;
use crate::config::{ConfigError, InteractionConfig};
use crate::nonce::NonceError;

/// Errors raised while resolving or dispatching a contract interaction.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required argument was blank or malformed.
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("provider '{0}' doesn't exist")]
    UnknownProvider(String),

    #[error("provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("unknown contract '{0}'")]
    UnknownContract(String),

    #[error("no contract configured for role '{0}'")]
    MissingContract(ContractRole),

    #[error("contract '{role}' has no method '{method}'")]
    UnknownMethod { role: ContractRole, method: String },

    #[error("invalid action '{0}', expected 'call' or 'send'")]
    InvalidAction(String),

    /// Arguments or return data did not match the ABI.
    #[error("ABI mismatch for '{method}': {message}")]
    Abi { method: String, message: String },

    /// A call returned a receipt or a send returned a value.
    #[error("unexpected dispatch outcome: expected {0}")]
    UnexpectedOutcome(&'static str),

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Trim `value` and reject it when nothing is left.
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> DispatchResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DispatchError::Validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

/// The contracts the dispatch layer knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRole {
    Consent,
    Access,
    FileManagement,
}

impl ContractRole {
    pub const ALL: [ContractRole; 3] = [ContractRole::Consent, ContractRole::Access, ContractRole::FileManagement];

    /// Case-insensitive match after trimming.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|role| role.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractRole::Consent => "consent",
            ContractRole::Access => "access",
            ContractRole::FileManagement => "fileManagement",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only call or state-changing send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Call,
    Send,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Call => "call",
            Action::Send => "send",
        }
    }
}

impl FromStr for Action {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Action::Call),
            "send" => Ok(Action::Send),
            _ => Err(DispatchError::InvalidAction(s.to_string())),
        }
    }
}

/// One dispatch request: what to do and which method to do it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAction {
    pub action: Action,
    pub method: String,
}

impl ContractAction {
    /// Parse a textual action (`call`/`send`, any case).
    pub fn new(action: &str, method: impl Into<String>) -> DispatchResult<Self> {
        Ok(Self {
            action: action.parse()?,
            method: method.into(),
        })
    }

    pub fn call(method: impl Into<String>) -> Self {
        Self {
            action: Action::Call,
            method: method.into(),
        }
    }

    pub fn send(method: impl Into<String>) -> Self {
        Self {
            action: Action::Send,
            method: method.into(),
        }
    }
}

/// The callable surface of one configured contract.
#[derive(Debug, Clone)]
pub struct MethodTable {
    role: ContractRole,
    address: Address,
    abi: Arc<JsonAbi>,
}

impl MethodTable {
    /// Resolve `role` against `config`.
    pub fn resolve(config: &InteractionConfig, role: &str) -> DispatchResult<Self> {
        let name = require_non_empty("contract role", role)?;
        let role = ContractRole::parse(name).ok_or_else(|| DispatchError::UnknownContract(name.to_string()))?;
        let contract = config.contract(role).ok_or(DispatchError::MissingContract(role))?;
        Ok(Self {
            role,
            address: contract.address,
            abi: Arc::clone(&contract.abi),
        })
    }

    pub fn role(&self) -> ContractRole {
        self.role
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Look up `method`, preferring the overload that takes `arity` arguments.
    pub fn function(&self, method: &str, arity: usize) -> DispatchResult<&Function> {
        let overloads = self.abi.function(method).ok_or_else(|| DispatchError::UnknownMethod {
            role: self.role,
            method: method.to_string(),
        })?;
        overloads
            .iter()
            .find(|f| f.inputs.len() == arity)
            .or_else(|| overloads.first())
            .ok_or_else(|| DispatchError::UnknownMethod {
                role: self.role,
                method: method.to_string(),
            })
    }

    /// ABI-encode a call to `method`; arity and types are checked here.
    pub fn encode(&self, method: &str, params: &[DynSolValue]) -> DispatchResult<Bytes> {
        let function = self.function(method, params.len())?;
        let data = function.abi_encode_input(params).map_err(|e| DispatchError::Abi {
            method: method.to_string(),
            message: e.to_string(),
        })?;
        Ok(Bytes::from(data))
    }

    /// Decode the return data of `method`.
    pub fn decode(&self, method: &str, arity: usize, data: &[u8]) -> DispatchResult<Vec<DynSolValue>> {
        let function = self.function(method, arity)?;
        function.abi_decode_output(data).map_err(|e| DispatchError::Abi {
            method: method.to_string(),
            message: e.to_string(),
        })
    }
}

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Decoded return values of a call.
    Value(Vec<DynSolValue>),
    /// Receipt of a mined send.
    Receipt(TxReceipt),
}

impl DispatchOutcome {
    pub fn into_values(self) -> DispatchResult<Vec<DynSolValue>> {
        match self {
            DispatchOutcome::Value(values) => Ok(values),
            DispatchOutcome::Receipt(_) => Err(DispatchError::UnexpectedOutcome("return values")),
        }
    }

    pub fn into_receipt(self) -> DispatchResult<TxReceipt> {
        match self {
            DispatchOutcome::Receipt(receipt) => Ok(receipt),
            DispatchOutcome::Value(_) => Err(DispatchError::UnexpectedOutcome("a receipt")),
        }
    }
}

/// Undecoded result of an adapter round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome {
    /// Return data of a call.
    Data(Bytes),
    /// Receipt of a mined send.
    Receipt(TxReceipt),
}
