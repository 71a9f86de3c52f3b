//! Provider factory: maps variant names to adapter constructors.
//!
//! # Responsibilities
//! - Hold the registered variants (`Web3`, `Legacy` and any added later)
//! - Hold the current interaction configuration, swappable at runtime
//! - Build a fresh adapter per `create` from the current snapshot
//!
//! # Design Decisions
//! - Constructed explicitly and shared by `Arc`; there is no global instance
//! - Registration names are case-sensitive and unique; lookup ignores case
//!   and the first registration wins
//! - Adapters created before `set_config` keep their old snapshot

use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::Arc;

use crate::blockchain::{HttpConnector, RpcConnector};
use crate::config::{load_interaction_config, DispatchConfig, InteractionConfig, TransactionConfig};
use crate::nonce::NonceManager;
use crate::provider::legacy::LegacyAdapter;
use crate::provider::standard::StandardAdapter;
use crate::provider::{DispatchError, DispatchResult, ProviderAdapter};

/// Everything an adapter constructor receives.
#[derive(Clone)]
pub struct AdapterContext {
    pub config: Arc<InteractionConfig>,
    pub connector: Arc<dyn RpcConnector>,
    pub transactions: TransactionConfig,
    pub nonces: Arc<NonceManager>,
}

/// Builds one adapter variant.
pub type AdapterConstructor = Arc<dyn Fn(AdapterContext) -> DispatchResult<Arc<dyn ProviderAdapter>> + Send + Sync>;

struct ProviderRegistration {
    name: String,
    constructor: AdapterConstructor,
}

pub struct ProviderFactory {
    registrations: Vec<ProviderRegistration>,
    config: ArcSwap<InteractionConfig>,
    connector: Arc<dyn RpcConnector>,
    transactions: TransactionConfig,
    nonces: Arc<NonceManager>,
}

impl ProviderFactory {
    pub const STANDARD: &'static str = "Web3";
    pub const LEGACY: &'static str = "Legacy";

    /// Create a factory with the built-in `Web3` and `Legacy` variants.
    pub fn new(
        config: InteractionConfig,
        connector: Arc<dyn RpcConnector>,
        transactions: TransactionConfig,
        nonces: Arc<NonceManager>,
    ) -> Self {
        let mut factory = Self {
            registrations: Vec::new(),
            config: ArcSwap::from_pointee(config),
            connector,
            transactions,
            nonces,
        };
        factory.registrations.push(ProviderRegistration {
            name: Self::STANDARD.to_string(),
            constructor: Arc::new(|ctx: AdapterContext| -> DispatchResult<Arc<dyn ProviderAdapter>> {
                Ok(Arc::new(StandardAdapter::new(ctx)?))
            }),
        });
        factory.registrations.push(ProviderRegistration {
            name: Self::LEGACY.to_string(),
            constructor: Arc::new(|ctx: AdapterContext| -> DispatchResult<Arc<dyn ProviderAdapter>> {
                Ok(Arc::new(LegacyAdapter::new(ctx)?))
            }),
        });
        factory
    }

    /// Create a factory speaking HTTP, with nonces stored per `file.nonce`.
    pub fn from_config(file: &DispatchConfig, interaction: InteractionConfig) -> DispatchResult<Self> {
        let nonces = NonceManager::from_config(&file.nonce)?;
        Ok(Self::new(
            interaction,
            Arc::new(HttpConnector),
            file.transactions.clone(),
            Arc::new(nonces),
        ))
    }

    /// Load a TOML configuration file and build an HTTP factory from it.
    pub fn load(path: &Path) -> DispatchResult<Self> {
        let (file, interaction) = load_interaction_config(path)?;
        Self::from_config(&file, interaction)
    }

    /// Add a variant. Fails if `name` is blank or already registered with
    /// exactly the same spelling.
    pub fn register_variant<F>(&mut self, name: &str, constructor: F) -> DispatchResult<()>
    where
        F: Fn(AdapterContext) -> DispatchResult<Arc<dyn ProviderAdapter>> + Send + Sync + 'static,
    {
        if name.trim().is_empty() {
            return Err(DispatchError::Validation("provider name must not be empty".to_string()));
        }
        if self.registrations.iter().any(|r| r.name == name) {
            return Err(DispatchError::DuplicateProvider(name.to_string()));
        }
        tracing::debug!(provider = name, "Registered provider variant");
        self.registrations.push(ProviderRegistration {
            name: name.to_string(),
            constructor: Arc::new(constructor),
        });
        Ok(())
    }

    /// Registered variant names, in registration order.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.name.as_str())
    }

    /// Replace the configuration used by subsequent `create` calls.
    pub fn set_config(&self, config: InteractionConfig) {
        tracing::info!(rpc_url = %config.rpc_url, "Interaction configuration replaced");
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<InteractionConfig> {
        self.config.load_full()
    }

    pub fn nonces(&self) -> &Arc<NonceManager> {
        &self.nonces
    }

    /// Build an adapter for `name` (case-insensitive).
    pub fn create(&self, name: &str) -> DispatchResult<Arc<dyn ProviderAdapter>> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Err(DispatchError::Validation("provider name must not be empty".to_string()));
        }
        let registration = self
            .registrations
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DispatchError::UnknownProvider(name.to_string()))?;

        let ctx = AdapterContext {
            config: self.config.load_full(),
            connector: Arc::clone(&self.connector),
            transactions: self.transactions.clone(),
            nonces: Arc::clone(&self.nonces),
        };
        (registration.constructor)(ctx)
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("variants", &self.variants().collect::<Vec<_>>())
            .field("rpc_url", &self.config.load().rpc_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ProviderFactory {
        // Connecting is lazy; nothing listens here
        ProviderFactory::new(
            InteractionConfig::new("http://127.0.0.1:1"),
            Arc::new(HttpConnector),
            TransactionConfig::default(),
            Arc::new(NonceManager::in_memory()),
        )
    }

    #[test]
    fn test_builtin_variants() {
        let factory = factory();
        assert_eq!(factory.variants().collect::<Vec<_>>(), vec!["Web3", "Legacy"]);
        assert_eq!(factory.create("Web3").unwrap().name(), "standard");
        assert_eq!(factory.create("WEB3").unwrap().name(), "standard");
        assert_eq!(factory.create("legacy").unwrap().name(), "legacy");
    }

    #[test]
    fn test_unknown_variant() {
        let err = factory().create("Ganache").err().unwrap();
        assert!(matches!(err, DispatchError::UnknownProvider(_)));
        assert!(err.to_string().contains("doesn't exist"));
        assert!(matches!(factory().create(" ").err().unwrap(), DispatchError::Validation(_)));
    }

    #[test]
    fn test_registration_is_case_sensitive() {
        let mut factory = factory();
        assert!(matches!(
            factory.register_variant("Web3", |ctx| Ok(Arc::new(LegacyAdapter::new(ctx)?) as Arc<dyn ProviderAdapter>)),
            Err(DispatchError::DuplicateProvider(_))
        ));

        // A different spelling registers, but lookup still finds the first one
        factory
            .register_variant("WEB3", |ctx| Ok(Arc::new(LegacyAdapter::new(ctx)?) as Arc<dyn ProviderAdapter>))
            .unwrap();
        assert_eq!(factory.create("WEB3").unwrap().name(), "standard");
        assert!(factory.register_variant("  ", |ctx| Ok(Arc::new(LegacyAdapter::new(ctx)?) as Arc<dyn ProviderAdapter>)).is_err());
    }

    #[test]
    fn test_set_config_applies_to_new_adapters() {
        let factory = factory();
        let before = factory.create("Web3").unwrap();

        factory.set_config(InteractionConfig::new("http://127.0.0.1:2").with_chain_id(5));
        let after = factory.create("Web3").unwrap();

        assert_eq!(before.config().rpc_url, "http://127.0.0.1:1");
        assert_eq!(after.config().rpc_url, "http://127.0.0.1:2");
        assert_eq!(factory.config().chain_id, Some(5));
    }
}
