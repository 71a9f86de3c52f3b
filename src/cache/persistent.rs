//! File-backed cache engine.
//!
//! Each namespace is one JSON object stored at `<storage_dir>/<namespace>.json`.
//! The file is loaded once at open and rewritten after every mutation. A file
//! that no longer parses is moved aside to `<namespace>.json.corrupt`.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::cache::{checked_key, CacheEngine, CacheResult};

/// A cache that survives process restarts.
#[derive(Debug)]
pub struct PersistentCache {
    path: PathBuf,
    inner: DashMap<String, String>,
    flush_lock: Mutex<()>,
}

impl PersistentCache {
    /// Open (or create) the store for `namespace` under `storage_dir`.
    pub fn open(storage_dir: &Path, namespace: &str) -> CacheResult<Self> {
        fs::create_dir_all(storage_dir)?;
        let path = storage_dir.join(format!("{}.json", sanitize(namespace)));

        let inner = DashMap::new();
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            match serde_json::from_reader::<_, BTreeMap<String, String>>(reader) {
                Ok(map) => {
                    for (k, v) in map {
                        inner.insert(k, v);
                    }
                    tracing::debug!(path = %path.display(), entries = inner.len(), "Loaded persistent cache");
                }
                Err(e) => {
                    // Keep the bytes for inspection and start empty
                    let quarantine = path.with_extension("json.corrupt");
                    tracing::warn!(
                        path = %path.display(),
                        moved_to = %quarantine.display(),
                        error = %e,
                        "Unreadable persistent cache, starting empty"
                    );
                    fs::rename(&path, &quarantine)?;
                }
            }
        }

        Ok(Self {
            path,
            inner,
            flush_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> CacheResult<()> {
        let _guard = self.flush_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let map: BTreeMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        // Write then rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CacheEngine for PersistentCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let key = checked_key(key)?;
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let key = checked_key(key)?;
        self.inner.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let key = checked_key(key)?;
        self.inner.remove(key);
        self.flush()
    }

    fn clear(&self) -> CacheResult<()> {
        self.inner.clear();
        self.flush()
    }
}

/// Keep namespaces usable as file names.
fn sanitize(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
