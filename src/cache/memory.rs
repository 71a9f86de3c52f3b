//! In-process cache engine.

use dashmap::DashMap;

use crate::cache::{checked_key, CacheEngine, CacheError, CacheResult};

/// A thread-safe map that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CacheEngine for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let key = checked_key(key)?;
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let key = checked_key(key)?;
        if value.is_empty() {
            return Err(CacheError::EmptyValue(key.to_string()));
        }
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let key = checked_key(key)?;
        self.inner.remove(key);
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        self.inner.clear();
        Ok(())
    }
}
