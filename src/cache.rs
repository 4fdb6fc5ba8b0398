//! Filesystem-backed response cache.
//!
//! One JSON file per entry under a base directory, addressed by a hash of the
//! caller's key. The cache is a pure optimization: every failure path inside
//! it degrades to a miss or a skipped write, never an error for the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::config::CacheConfig;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    /// Epoch millis at write time.
    ts: i64,
}

/// Content-addressed get/set store with count-based, oldest-first eviction.
///
/// An explicit handle rather than ambient state, so tests can point each
/// instance at an isolated temporary directory.
#[derive(Debug, Clone)]
pub struct CacheManager {
    base_dir: PathBuf,
    max_entries: usize,
}

impl CacheManager {
    pub fn new(base_dir: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            max_entries,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.dir, config.max_entries)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.base_dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Read the entry for `key`. Any failure (missing file, corrupt content)
    /// is a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Some(entry.value),
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the entry for `key`, overwriting any previous one, then run
    /// garbage collection. Write and GC failures are logged and swallowed.
    pub async fn set(&self, key: &str, value: &Value) {
        if let Err(e) = self.write_entry(key, value).await {
            tracing::warn!("Cache write failed: {}", e);
            return;
        }

        if let Err(e) = self.collect_garbage().await {
            tracing::warn!("Cache GC failed: {}", e);
        }
    }

    async fn write_entry(&self, key: &str, value: &Value) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let entry = CacheEntry {
            value: value.clone(),
            ts: Utc::now().timestamp_millis(),
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        tokio::fs::write(self.path_for(key), bytes).await
    }

    /// Delete oldest-by-mtime surplus entries until the count equals
    /// `max_entries`. Concurrent callers may race; deleting an entry that
    /// already vanished is not a failure.
    async fn collect_garbage(&self) -> std::io::Result<()> {
        let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();

        let mut dir = tokio::fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            entries.push((path, modified));
        }

        if entries.len() <= self.max_entries {
            return Ok(());
        }

        entries.sort_by_key(|(_, modified)| *modified);
        let surplus = entries.len() - self.max_entries;

        for (path, _) in entries.into_iter().take(surplus) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!("Could not evict {}: {}", path.display(), e);
            } else {
                tracing::debug!("Evicted cache entry {}", path.display());
            }
        }

        Ok(())
    }
}
