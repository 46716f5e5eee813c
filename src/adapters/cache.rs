//! Expiring key/value caches for fetched schemas and tokens
//!
//! Provides three backends behind the [`Cache`] trait:
//! - [`InMemoryCache`]: process-local, lost on restart
//! - [`FileCache`]: one JSON file per key on disk
//! - [`TieredCache`]: memory in front of disk, promoting disk hits
//!
//! Cache failures are logged and read as misses; they never fail a fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::RwLock;

/// A cached value and its expiry (`None` never expires)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn new(value: Value, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        Self { value, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Time left before expiry; `None` for entries that never expire.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Trait for expiring caches
#[async_trait]
pub trait Cache: Send + Sync {
    /// Load an unexpired entry
    async fn get_entry(&self, key: &str) -> Option<CacheEntry>;

    /// Store a value for `ttl`
    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Remove a key
    async fn forget(&self, key: &str);

    async fn get(&self, key: &str) -> Option<Value> {
        self.get_entry(key).await.map(|entry| entry.value)
    }
}

pub type SharedCache = Arc<dyn Cache>;

// ============================================================================
// In-memory
// ============================================================================

/// Process-local cache
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn put_entry(&self, key: &str, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        None
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        self.put_entry(key, CacheEntry::new(value, ttl)).await;
    }

    async fn forget(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }
}

// ============================================================================
// On disk
// ============================================================================

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    #[serde(flatten)]
    entry: CacheEntry,
}

/// File-backed cache, one JSON document per key
#[derive(Debug, Clone)]
pub struct FileCache {
    base_path: PathBuf,
}

impl FileCache {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// File holding `key`; the name is the SHA-256 of the key.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.base_path.join(format!("{:x}.json", digest))
    }

    async fn write_entry(&self, key: &str, entry: CacheEntry) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        let stored = StoredEntry {
            key: key.to_string(),
            entry,
        };
        let content = serde_json::to_vec(&stored)?;
        fs::write(self.entry_path(key), content).await
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        let stored: StoredEntry = match serde_json::from_slice(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache file {}: {}", path.display(), e);
                let _ = fs::remove_file(&path).await;
                return None;
            }
        };

        if stored.key != key || stored.entry.is_expired() {
            let _ = fs::remove_file(&path).await;
            return None;
        }

        Some(stored.entry)
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        if let Err(e) = self.write_entry(key, CacheEntry::new(value, ttl)).await {
            tracing::warn!("Failed to write cache entry {}: {}", key, e);
        }
    }

    async fn forget(&self, key: &str) {
        let path = self.entry_path(key);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete cache file {}: {}", path.display(), e);
            }
        }
    }
}

// ============================================================================
// Tiered
// ============================================================================

/// Memory in front of disk
pub struct TieredCache {
    memory: InMemoryCache,
    disk: FileCache,
}

impl TieredCache {
    pub fn new(disk: FileCache) -> Self {
        Self {
            memory: InMemoryCache::new(),
            disk,
        }
    }

    pub fn memory(&self) -> &InMemoryCache {
        &self.memory
    }

    pub fn disk(&self) -> &FileCache {
        &self.disk
    }
}

#[async_trait]
impl Cache for TieredCache {
    async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.memory.get_entry(key).await {
            tracing::debug!("Cache hit (memory): {}", key);
            return Some(entry);
        }

        let entry = self.disk.get_entry(key).await?;
        tracing::debug!("Cache hit (disk): {}", key);
        self.memory.put_entry(key, entry.clone()).await;
        Some(entry)
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        self.memory.put_entry(key, entry.clone()).await;
        if let Err(e) = self.disk.write_entry(key, entry).await {
            tracing::warn!("Failed to write cache entry {}: {}", key, e);
        }
    }

    async fn forget(&self, key: &str) {
        self.memory.forget(key).await;
        self.disk.forget(key).await;
    }
}
