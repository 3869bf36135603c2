// TTL-bound cache for release lookups

use crate::release::CachedRelease;
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" in unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Clock that only moves when told to
#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self(AtomicU64::new(start))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Key-value store whose entries expire after a per-entry TTL.
///
/// Expired entries are never returned. Concurrent writers are last-write-wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedRelease>;
    fn set(&self, key: &str, value: &CachedRelease, ttl: Duration) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    expires_at: u64,
    value: CachedRelease,
}

/// Cache persisted as one JSON file per key, so entries survive restarts
pub struct FileCache {
    dir: PathBuf,
    clock: Box<dyn Clock>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Box::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read_entry(path: &Path) -> Option<CacheEntry> {
        let text = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&text) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<CachedRelease> {
        let path = self.entry_path(key);
        let entry = Self::read_entry(&path)?;
        if self.clock.now() >= entry.expires_at {
            debug!("Cache entry {} expired", key);
            if let Err(e) = fs::remove_file(&path) {
                debug!("Could not remove expired entry {}: {}", path.display(), e);
            }
            return None;
        }
        Some(entry.value)
    }

    fn set(&self, key: &str, value: &CachedRelease, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            expires_at: self.clock.now() + ttl.as_secs(),
            value: value.clone(),
        };
        let text = serde_json::to_string_pretty(&entry)?;

        // Write to a sibling temp file first so readers never see a torn entry
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Process-local cache, mainly for tests and one-shot runs
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Box<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedRelease> {
        let mut entries = self.entries.lock().ok()?;
        let expired = entries
            .get(key)
            .is_some_and(|entry| self.clock.now() >= entry.expires_at);
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &CachedRelease, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                expires_at: self.clock.now() + ttl.as_secs(),
                value: value.clone(),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::ReleaseData;

    fn sample() -> CachedRelease {
        CachedRelease::Available(ReleaseData {
            tag_name: Some("v1.2.0".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_file_cache_expires_after_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = FileCache::with_clock(dir.path(), Box::new(clock.clone()));

        cache.set("k", &sample(), Duration::from_secs(7200)).unwrap();
        assert_eq!(cache.get("k"), Some(sample()));

        clock.advance(Duration::from_secs(7199));
        assert_eq!(cache.get("k"), Some(sample()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k"), None);
        assert!(!dir.path().join("k.json").exists());
    }

    #[test]
    fn test_file_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileCache::new(dir.path())
            .set("k", &sample(), Duration::from_secs(60))
            .unwrap();

        let reopened = FileCache::new(dir.path());
        assert_eq!(reopened.get("k"), Some(sample()));
    }

    #[test]
    fn test_file_cache_ignores_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("k.json"), "{not json").unwrap();
        let cache = FileCache::new(dir.path());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("never-created"));
        assert!(cache.delete("k").is_ok());
        assert!(MemoryCache::new().delete("k").is_ok());
    }

    #[test]
    fn test_memory_cache_expiry() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = MemoryCache::with_clock(Box::new(clock.clone()));
        cache.set("k", &sample(), Duration::from_secs(10)).unwrap();
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_secs(10));
        assert!(cache.get("k").is_none());
    }
}
