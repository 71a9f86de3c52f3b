//! A single nonce counter stored in a cache engine.

use std::sync::Arc;

use crate::cache::{CacheEngine, CacheRegistry};
use crate::nonce::{NonceError, NonceResult};

/// Logical key the counter lives under inside its namespace.
pub const NONCE_KEY: &str = "nonce";

/// One counter, persisted through a [`CacheEngine`].
///
/// The sequencer is a plain read/overwrite primitive. Whether a new value
/// may be lower than the current one is decided by its callers. Clones share
/// the same engine.
#[derive(Clone)]
pub struct NonceSequencer {
    engine: Arc<dyn CacheEngine>,
    namespace: String,
}

impl NonceSequencer {
    /// Resolve `backend` through the registry and persist `seed` immediately.
    pub fn new(registry: &CacheRegistry, backend: &str, namespace: &str, seed: u64) -> NonceResult<Self> {
        let engine = registry.open(backend, namespace)?;
        Self::with_engine(engine, namespace, seed)
    }

    /// Build on an already opened engine and persist `seed` immediately.
    pub fn with_engine(engine: Arc<dyn CacheEngine>, namespace: &str, seed: u64) -> NonceResult<Self> {
        let sequencer = Self {
            engine,
            namespace: namespace.to_string(),
        };
        sequencer.advance(seed)?;
        Ok(sequencer)
    }

    /// The stored value.
    pub fn current(&self) -> NonceResult<u64> {
        let raw = self
            .engine
            .get(NONCE_KEY)?
            .ok_or_else(|| NonceError::Missing {
                namespace: self.namespace.clone(),
            })?;
        raw.trim().parse::<u64>().map_err(|_| NonceError::Decode {
            namespace: self.namespace.clone(),
            value: raw,
        })
    }

    /// Overwrite the stored value.
    pub fn advance(&self, value: u64) -> NonceResult<()> {
        self.engine.set(NONCE_KEY, &value.to_string())?;
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Debug for NonceSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSequencer")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
