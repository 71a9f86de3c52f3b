//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every contract entry names a known role, a parseable address and
//!   exactly one ABI source
//! - Validate value ranges (timeouts > 0, poll bounds ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: DispatchConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;
use std::net::SocketAddr;
use thiserror::Error;

use crate::cache::CacheBackend;
use crate::config::schema::DispatchConfig;
use crate::provider::ContractRole;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a parsed configuration.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.chain.rpc_url) {
        errors.push(ValidationError::new("chain.rpc_url", format!("invalid URL: {e}")));
    }
    for (i, failover) in config.chain.failover_urls.iter().enumerate() {
        if let Err(e) = url::Url::parse(failover) {
            errors.push(ValidationError::new(
                format!("chain.failover_urls[{i}]"),
                format!("invalid URL: {e}"),
            ));
        }
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }

    for (name, entry) in &config.contracts {
        let field = format!("contracts.{name}");
        if ContractRole::parse(name).is_none() {
            errors.push(ValidationError::new(&field, "unknown contract role"));
        }
        if entry.address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                format!("{field}.address"),
                format!("'{}' is not a valid address", entry.address),
            ));
        }
        match (&entry.abi, &entry.abi_path) {
            (Some(_), Some(_)) => errors.push(ValidationError::new(
                &field,
                "set either `abi` or `abi_path`, not both",
            )),
            (None, None) => errors.push(ValidationError::new(&field, "missing `abi` or `abi_path`")),
            _ => {}
        }
    }

    let tx = &config.transactions;
    if tx.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transactions.receipt_timeout_secs",
            "must be greater than 0",
        ));
    }
    if tx.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "transactions.receipt_poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if tx.receipt_poll_max_interval_ms < tx.receipt_poll_interval_ms {
        errors.push(ValidationError::new(
            "transactions.receipt_poll_max_interval_ms",
            "must not be smaller than receipt_poll_interval_ms",
        ));
    }
    if tx.legacy_gas_limit == 0 {
        errors.push(ValidationError::new("transactions.legacy_gas_limit", "must be greater than 0"));
    }

    if config.nonce.backend.parse::<CacheBackend>().is_err() {
        errors.push(ValidationError::new(
            "nonce.backend",
            format!("unknown cache backend '{}'", config.nonce.backend),
        ));
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", obs.log_level, LOG_LEVELS.join(", ")),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
