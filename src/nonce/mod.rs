//! Nonce sequencing per signer.
//!
//! # Data Flow
//! ```text
//! Adapter send path:
//!     NonceManager::lock(signer)          (per-signer async mutex)
//!     → NonceGuard::reconcile(on_chain)   (max of chain count and local value)
//!     → sign + broadcast + receipt
//!     → NonceGuard::commit(used)          (advance to used + 1)
//!     → guard dropped, next send for the signer proceeds
//! ```
//!
//! # Design Decisions
//! - One sequencer per signer, created lazily on first send
//! - The whole reconcile → broadcast → advance sequence runs under the
//!   signer's lock; different signers never wait on each other
//! - The counter only moves after a receipt; failures leave it untouched
//! - Engine writes and first-time opens run on the blocking pool, since the
//!   persistent backend does file I/O

pub mod sequencer;

pub use sequencer::{NonceSequencer, NONCE_KEY};

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::cache::{CacheError, CacheRegistry};
use crate::config::NonceConfig;
use crate::observability::metrics;

/// Errors raised by nonce bookkeeping.
#[derive(Debug, Error)]
pub enum NonceError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no nonce stored for {namespace}")]
    Missing { namespace: String },

    #[error("stored nonce for {namespace} is not a number: '{value}'")]
    Decode { namespace: String, value: String },

    #[error("nonce for {0} would overflow")]
    Overflow(Address),

    #[error("nonce storage task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

/// Result type for nonce operations.
pub type NonceResult<T> = Result<T, NonceError>;

/// Owns one [`NonceSequencer`] per signer, each behind its own lock.
pub struct NonceManager {
    registry: CacheRegistry,
    backend: String,
    seed: u64,
    slots: DashMap<Address, Arc<Mutex<NonceSequencer>>>,
    opening: Mutex<()>,
}

impl NonceManager {
    /// Create a manager; the backend name is checked up front.
    pub fn new(registry: CacheRegistry, backend: impl Into<String>, seed: u64) -> NonceResult<Self> {
        let backend = backend.into();
        backend.parse::<crate::cache::CacheBackend>()?;
        Ok(Self {
            registry,
            backend,
            seed,
            slots: DashMap::new(),
            opening: Mutex::new(()),
        })
    }

    pub fn from_config(config: &NonceConfig) -> NonceResult<Self> {
        Self::new(CacheRegistry::new(config.storage_dir.clone()), config.backend.clone(), config.seed)
    }

    /// In-memory manager starting every signer at zero.
    pub fn in_memory() -> Self {
        Self {
            registry: CacheRegistry::new(std::env::temp_dir()),
            backend: "memory".to_string(),
            seed: 0,
            slots: DashMap::new(),
            opening: Mutex::new(()),
        }
    }

    /// Take the signer's lock. Held for the whole send.
    pub async fn lock(&self, signer: Address) -> NonceResult<NonceGuard> {
        let slot = self.slot(signer).await?;
        let sequencer = slot.lock_owned().await;
        Ok(NonceGuard { signer, sequencer })
    }

    /// The signer's stored value, or `None` if it never sent.
    pub async fn peek(&self, signer: Address) -> NonceResult<Option<u64>> {
        let Some(slot) = self.existing(signer) else {
            return Ok(None);
        };
        let sequencer = slot.lock().await;
        sequencer.current().map(Some)
    }

    fn existing(&self, signer: Address) -> Option<Arc<Mutex<NonceSequencer>>> {
        self.slots.get(&signer).map(|r| Arc::clone(r.value()))
    }

    /// The signer's slot, opening its sequencer on first use.
    ///
    /// Opens are serialized so two first sends never race on the same file.
    async fn slot(&self, signer: Address) -> NonceResult<Arc<Mutex<NonceSequencer>>> {
        if let Some(slot) = self.existing(signer) {
            return Ok(slot);
        }

        let _opening = self.opening.lock().await;
        if let Some(slot) = self.existing(signer) {
            return Ok(slot);
        }

        let registry = self.registry.clone();
        let backend = self.backend.clone();
        let seed = self.seed;
        let sequencer =
            tokio::task::spawn_blocking(move || open_sequencer(&registry, &backend, seed, signer)).await??;

        let slot = Arc::new(Mutex::new(sequencer));
        self.slots.insert(signer, Arc::clone(&slot));
        Ok(slot)
    }
}

/// Resume from a value left by an earlier process when there is one.
fn open_sequencer(registry: &CacheRegistry, backend: &str, seed: u64, signer: Address) -> NonceResult<NonceSequencer> {
    let namespace = signer.to_string().to_lowercase();
    let engine = registry.open(backend, &namespace)?;

    let start = match engine.get(NONCE_KEY)? {
        Some(stored) => match stored.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(signer = %signer, stored = %stored, "Discarding unreadable stored nonce");
                seed
            }
        },
        None => seed,
    };

    tracing::debug!(signer = %signer, backend, seed = start, "Opened nonce sequencer");
    NonceSequencer::with_engine(engine, &namespace, start)
}

impl std::fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceManager")
            .field("backend", &self.backend)
            .field("seed", &self.seed)
            .field("signers", &self.slots.len())
            .finish()
    }
}

/// Exclusive access to one signer's sequencer.
pub struct NonceGuard {
    signer: Address,
    sequencer: OwnedMutexGuard<NonceSequencer>,
}

impl NonceGuard {
    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn current(&self) -> NonceResult<u64> {
        self.sequencer.current()
    }

    /// Pick the nonce for the next transaction: the larger of the chain's
    /// pending count and the local counter.
    pub fn reconcile(&self, on_chain: u64) -> NonceResult<u64> {
        let local = self.sequencer.current()?;
        let nonce = on_chain.max(local);
        tracing::debug!(signer = %self.signer, on_chain, local, nonce, "Reconciled nonce");
        Ok(nonce)
    }

    /// Record that `used` was consumed by a mined transaction.
    pub async fn commit(&mut self, used: u64) -> NonceResult<u64> {
        let next = used.checked_add(1).ok_or(NonceError::Overflow(self.signer))?;
        let sequencer = (*self.sequencer).clone();
        tokio::task::spawn_blocking(move || sequencer.advance(next)).await??;
        metrics::record_nonce(&self.signer.to_string(), next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reconcile_takes_larger_value() {
        let manager = NonceManager::in_memory();
        let signer = Address::repeat_byte(0x01);

        let mut guard = manager.lock(signer).await.unwrap();
        assert_eq!(guard.reconcile(4).unwrap(), 4);
        guard.commit(4).await.unwrap();
        assert_eq!(guard.reconcile(2).unwrap(), 5);
        assert_eq!(guard.reconcile(9).unwrap(), 9);
    }

    #[tokio::test]
    async fn test_peek_unknown_signer() {
        let manager = NonceManager::in_memory();
        assert_eq!(manager.peek(Address::ZERO).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lock_serializes_same_signer() {
        let manager = Arc::new(NonceManager::in_memory());
        let signer = Address::repeat_byte(0x02);

        let guard = manager.lock(signer).await.unwrap();
        let contender = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.lock(signer).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        // Another signer is not blocked
        let other = manager.lock(Address::repeat_byte(0x03)).await;
        assert!(other.is_ok());

        drop(guard);
        contender.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_persistent_manager_resumes() {
        let dir = std::env::temp_dir().join(format!("contract-dispatch-nonce-{}", std::process::id()));
        let signer = Address::repeat_byte(0x04);

        {
            let manager = NonceManager::new(CacheRegistry::new(&dir), "persistent", 0).unwrap();
            let mut guard = manager.lock(signer).await.unwrap();
            let nonce = guard.reconcile(0).unwrap();
            guard.commit(nonce + 6).await.unwrap();
        }

        let manager = NonceManager::new(CacheRegistry::new(&dir), "persistent", 0).unwrap();
        assert_eq!(manager.lock(signer).await.unwrap().current().unwrap(), 7);

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_sends_share_one_sequencer() {
        let dir = std::env::temp_dir().join(format!("contract-dispatch-nonce-race-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let manager = Arc::new(NonceManager::new(CacheRegistry::new(&dir), "persistent", 0).unwrap());
        let signer = Address::repeat_byte(0x05);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    let mut guard = manager.lock(signer).await.unwrap();
                    let nonce = guard.reconcile(0).unwrap();
                    guard.commit(nonce).await.unwrap()
                })
            })
            .collect();
        let mut committed = Vec::new();
        for task in tasks {
            committed.push(task.await.unwrap());
        }
        committed.sort_unstable();
        assert_eq!(committed, (1..=8).collect::<Vec<_>>());

        let reopened = NonceManager::new(CacheRegistry::new(&dir), "persistent", 0).unwrap();
        assert_eq!(reopened.lock(signer).await.unwrap().current().unwrap(), 8);

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = NonceManager::new(CacheRegistry::new("."), "redis", 0).unwrap_err();
        assert!(matches!(err, NonceError::Cache(CacheError::UnknownBackend(_))));
    }

    #[tokio::test]
    async fn test_commit_overflow() {
        let manager = NonceManager::in_memory();
        let mut guard = manager.lock(Address::ZERO).await.unwrap();
        assert!(matches!(guard.commit(u64::MAX).await, Err(NonceError::Overflow(_))));
        assert_eq!(guard.current().unwrap(), 0);
    }
}
