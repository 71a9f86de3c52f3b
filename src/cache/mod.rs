//! Key/value cache engines backing the nonce counters.
//!
//! # Data Flow
//! ```text
//! NonceSequencer
//!     → CacheRegistry::open(backend name, namespace)
//!     → memory.rs     (process lifetime only)
//!     → persistent.rs (JSON file per namespace, survives restarts)
//! ```
//!
//! # Design Decisions
//! - Both backends implement the same `CacheEngine` trait and are interchangeable
//! - Keys must be non-empty after trimming, for reads and writes alike
//! - Only the memory backend rejects empty values; the persistent backend
//!   round-trips them through JSON
//! - Engines are synchronous; async callers run them on the blocking pool

pub mod memory;
pub mod persistent;

pub use memory::MemoryCache;
pub use persistent::PersistentCache;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by cache engines.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache key must not be empty")]
    EmptyKey,

    #[error("cache value for '{0}' must not be empty")]
    EmptyValue(String),

    #[error("cache namespace must not be empty")]
    EmptyNamespace,

    #[error("unknown cache backend '{0}'")]
    UnknownBackend(String),

    #[error("cache storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// A string key/value store.
pub trait CacheEngine: Send + Sync {
    /// Read a value. Missing keys yield `Ok(None)`.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> CacheResult<()>;

    /// Remove every value.
    fn clear(&self) -> CacheResult<()>;
}

/// Trim and check a key.
pub(crate) fn checked_key(key: &str) -> CacheResult<&str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CacheError::EmptyKey);
    }
    Ok(key)
}

/// The fixed set of cache backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Persistent,
}

impl FromStr for CacheBackend {
    type Err = CacheError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(CacheBackend::Memory),
            "persistent" | "local" => Ok(CacheBackend::Persistent),
            _ => Err(CacheError::UnknownBackend(name.to_string())),
        }
    }
}

/// Resolves backend names to namespaced cache engines.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    storage_dir: PathBuf,
}

impl CacheRegistry {
    /// Registry whose persistent backend stores files under `storage_dir`.
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Open the engine named `backend` for `namespace`.
    pub fn open(&self, backend: &str, namespace: &str) -> CacheResult<Arc<dyn CacheEngine>> {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            return Err(CacheError::EmptyNamespace);
        }
        let engine: Arc<dyn CacheEngine> = match backend.parse::<CacheBackend>()? {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::Persistent => Arc::new(PersistentCache::open(&self.storage_dir, namespace)?),
        };
        Ok(engine)
    }
}
