//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure for the dispatch
//! layer. All types derive Serde traits for deserialization from TOML files,
//! and every field has a default so minimal files stay minimal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Chain endpoint settings.
    pub chain: ChainConfig,

    /// Contract address/ABI per contract role, keyed by role name.
    pub contracts: BTreeMap<String, ContractEntry>,

    /// Transaction construction and receipt waiting.
    pub transactions: TransactionConfig,

    /// Nonce persistence.
    pub nonce: NonceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// Chain ID used for EIP-155 signing. Queried from the node when unset.
    pub chain_id: Option<u64>,

    /// Deadline for a single RPC round trip in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 10,
        }
    }
}

/// Where one contract role lives and what it looks like.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractEntry {
    /// Deployed address, `0x`-prefixed hex.
    pub address: String,

    /// Inline JSON ABI.
    pub abi: Option<String>,

    /// Path to a JSON ABI file, relative to the config file.
    pub abi_path: Option<PathBuf>,
}

/// Transaction construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas price used by the standard adapter, in gwei.
    pub gas_price_gwei: u64,

    /// Fixed gas ceiling used by the legacy adapter.
    pub legacy_gas_limit: u64,

    /// How long to wait for a receipt after broadcasting, in seconds.
    pub receipt_timeout_secs: u64,

    /// First delay between receipt polls in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Upper bound on the delay between receipt polls in milliseconds.
    pub receipt_poll_max_interval_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_price_gwei: 30,
            legacy_gas_limit: 4_700_000,
            receipt_timeout_secs: 60,
            receipt_poll_interval_ms: 500,
            receipt_poll_max_interval_ms: 4_000,
        }
    }
}

/// Nonce persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NonceConfig {
    /// Cache backend name (`memory` or `persistent`).
    pub backend: String,

    /// Directory holding the persistent backend's files.
    pub storage_dir: PathBuf,

    /// Value a signer's counter starts from when nothing is stored yet.
    pub seed: u64,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            storage_dir: PathBuf::from(".nonce-cache"),
            seed: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
