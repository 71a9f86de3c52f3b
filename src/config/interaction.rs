//! Runtime interaction configuration shared by every adapter.

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::loader::ConfigError;
use crate::config::schema::DispatchConfig;
use crate::provider::ContractRole;

/// Address and ABI of one deployed contract.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub address: Address,
    pub abi: Arc<JsonAbi>,
}

impl ContractConfig {
    /// Create a contract entry from an already parsed ABI.
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self {
            address,
            abi: Arc::new(abi),
        }
    }

    /// Create a contract entry from a JSON ABI document.
    pub fn from_json(address: Address, abi_json: &str) -> Result<Self, ConfigError> {
        let abi: JsonAbi = serde_json::from_str(abi_json).map_err(ConfigError::Abi)?;
        Ok(Self::new(address, abi))
    }
}

/// Connection endpoint plus per-role contract configuration.
///
/// Immutable once built; adapters hold it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct InteractionConfig {
    pub rpc_url: String,
    pub failover_urls: Vec<String>,
    pub chain_id: Option<u64>,
    pub rpc_timeout: Duration,
    contracts: HashMap<ContractRole, ContractConfig>,
}

impl InteractionConfig {
    /// Configuration for a single endpoint with no contracts yet.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout: Duration::from_secs(10),
            contracts: HashMap::new(),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    pub fn with_failover(mut self, url: impl Into<String>) -> Self {
        self.failover_urls.push(url.into());
        self
    }

    pub fn with_contract(mut self, role: ContractRole, contract: ContractConfig) -> Self {
        self.contracts.insert(role, contract);
        self
    }

    /// The contract configured for `role`, if any.
    pub fn contract(&self, role: ContractRole) -> Option<&ContractConfig> {
        self.contracts.get(&role)
    }

    /// Resolve a validated file configuration.
    ///
    /// `abi_path` entries are read relative to `base_dir`.
    pub fn from_config(config: &DispatchConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut interaction = Self::new(config.chain.rpc_url.clone())
            .with_rpc_timeout(Duration::from_secs(config.chain.rpc_timeout_secs));
        interaction.chain_id = config.chain.chain_id;
        interaction.failover_urls = config.chain.failover_urls.clone();

        for (name, entry) in &config.contracts {
            let role = ContractRole::parse(name).ok_or_else(|| ConfigError::UnknownRole(name.clone()))?;
            let address: Address = entry
                .address
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(entry.address.clone()))?;
            let abi_json = match (&entry.abi, &entry.abi_path) {
                (Some(inline), _) => inline.clone(),
                (None, Some(path)) => std::fs::read_to_string(base_dir.join(path)).map_err(ConfigError::Io)?,
                (None, None) => return Err(ConfigError::MissingAbi(name.clone())),
            };
            interaction.contracts.insert(role, ContractConfig::from_json(address, &abi_json)?);
        }

        Ok(interaction)
    }
}
