use super::backend::{CacheBackend, FileBackend};
use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Default entry lifetime: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL cache of upstream payloads, persisted as one JSON document.
///
/// Every mutation rewrites the whole document synchronously. Persistence
/// failures are logged and otherwise ignored: the in-memory map stays
/// authoritative for the life of the process.
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    backend: Box<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Outcome of [`CacheStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Live entries after pruning.
    pub entries: usize,
    /// Entries dropped because they had expired.
    pub expired: usize,
}

/// Snapshot for `cache stats`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub location: String,
    pub ttl_secs: u64,
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStore {
    /// Create an empty store. Call [`CacheStore::load`] to pick up persisted entries.
    pub fn new(backend: impl CacheBackend + 'static, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            backend: Box::new(backend),
            clock,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Open the file-backed store at `path` and load it.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let store = Self::new(FileBackend::new(path), ttl, Arc::new(SystemClock));
        store.load();
        store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace the in-memory map with the persisted one, then prune expired entries.
    ///
    /// Unreadable or unparseable storage resets the cache to empty.
    pub fn load(&self) -> LoadSummary {
        let loaded = match self.backend.read() {
            Ok(Some(contents)) => match serde_json::from_str::<HashMap<String, CacheEntry>>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!(
                        "Cache file {} is not valid JSON, starting empty: {}",
                        self.backend.describe(),
                        e
                    );
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!("Failed to read cache {}: {}", self.backend.describe(), e);
                HashMap::new()
            }
        };

        *self.lock() = loaded;
        let expired = self.prune();
        let entries = self.len();
        info!(
            "Cache loaded from {}: {} entries ({} expired removed)",
            self.backend.describe(),
            entries,
            expired
        );
        LoadSummary { entries, expired }
    }

    /// Fresh payload for `key`, or `None` on a miss or an expired entry.
    ///
    /// Expired entries are left in place; they are only removed by `prune`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache stale: {}", key);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss: {}", key);
                None
            }
        }
    }

    /// Insert or overwrite `key`, stamped with the current time, and persist.
    pub fn put(&self, key: &str, data: Value) {
        let entry = CacheEntry::new(data, self.clock.now());
        let mut entries = self.lock();
        entries.insert(key.to_string(), entry);
        self.persist(&entries);
    }

    /// Remove every expired entry. Persists only when something was removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&entries);
        }
        removed
    }

    /// Drop every entry and persist the empty map. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        self.persist(&entries);
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted keys of every stored entry, fresh or not.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let fresh = entries
            .values()
            .filter(|e| e.is_fresh(now, self.ttl))
            .count();

        CacheStats {
            location: self.backend.describe(),
            ttl_secs: self.ttl.as_secs(),
            entries: entries.len(),
            fresh,
            stale: entries.len() - fresh,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let contents = match serde_json::to_string(entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.write(&contents) {
            warn!("Failed to write cache {}: {}", self.backend.describe(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryBackend};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::io;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn memory_store() -> (CacheStore, Arc<MemoryBackend>, Arc<ManualClock>) {
        let backend = Arc::new(MemoryBackend::new());
        let clock = Arc::new(ManualClock::new(start()));
        let store = CacheStore::new(backend.clone(), DEFAULT_TTL, clock.clone());
        (store, backend, clock)
    }

    struct BrokenBackend;

    impl CacheBackend for BrokenBackend {
        fn read(&self) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write(&self, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_put_then_get() {
        let (store, backend, _clock) = memory_store();
        store.put("current:{}", json!({"temp": 12.5}));

        assert_eq!(store.get("current:{}"), Some(json!({"temp": 12.5})));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_get_unknown_key_is_miss() {
        let (store, _backend, _clock) = memory_store();
        assert!(store.get("nope").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_expired_entry_not_served_but_kept() {
        let (store, _backend, clock) = memory_store();
        store.put("k", json!(1));

        clock.advance(DEFAULT_TTL);
        assert!(store.get("k").is_none());
        // Stale entries stay in memory until the next prune.
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().stale, 1);
    }

    #[test]
    fn test_put_refreshes_timestamp() {
        let (store, _backend, clock) = memory_store();
        store.put("k", json!("old"));
        clock.advance(Duration::from_secs(20 * 60));
        store.put("k", json!("new"));
        clock.advance(Duration::from_secs(20 * 60));

        assert_eq!(store.get("k"), Some(json!("new")));
    }

    #[test]
    fn test_persisted_document_shape() {
        let (store, backend, _clock) = memory_store();
        store.put("air_pollution:{}", json!({"list": []}));

        let doc: serde_json::Value =
            serde_json::from_str(&backend.contents().unwrap()).unwrap();
        assert_eq!(
            doc,
            json!({
                "air_pollution:{}": {
                    "data": {"list": []},
                    "timestamp": start().timestamp_millis(),
                }
            })
        );
    }

    #[test]
    fn test_load_prunes_expired_entries() {
        let now = start();
        let fresh = CacheEntry::new(json!("fresh"), now - chrono::Duration::minutes(5));
        let stale = CacheEntry::new(json!("stale"), now - chrono::Duration::minutes(45));
        let seed = serde_json::to_string(&HashMap::from([
            ("fresh".to_string(), fresh),
            ("stale".to_string(), stale),
        ]))
        .unwrap();

        let backend = Arc::new(MemoryBackend::with_contents(seed));
        let store = CacheStore::new(backend.clone(), DEFAULT_TTL, Arc::new(ManualClock::new(now)));

        assert_eq!(store.load(), LoadSummary { entries: 1, expired: 1 });
        assert_eq!(store.get("fresh"), Some(json!("fresh")));
        assert!(store.get("stale").is_none());
        // Pruning rewrote the file without the stale entry.
        assert_eq!(backend.write_count(), 1);
        assert!(!backend.contents().unwrap().contains("stale"));
    }

    #[test]
    fn test_load_without_expired_entries_does_not_write() {
        let now = start();
        let seed = serde_json::to_string(&HashMap::from([(
            "k".to_string(),
            CacheEntry::new(json!(1), now),
        )]))
        .unwrap();
        let backend = Arc::new(MemoryBackend::with_contents(seed));
        let store = CacheStore::new(backend.clone(), DEFAULT_TTL, Arc::new(ManualClock::new(now)));

        assert_eq!(store.load().expired, 0);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_load_corrupt_document_resets_to_empty() {
        let backend = Arc::new(MemoryBackend::with_contents("{not json"));
        let store = CacheStore::new(backend, DEFAULT_TTL, Arc::new(ManualClock::new(start())));

        assert_eq!(store.load().entries, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_io_failures_are_swallowed() {
        let store = CacheStore::new(BrokenBackend, DEFAULT_TTL, Arc::new(ManualClock::new(start())));
        assert_eq!(store.load().entries, 0);

        store.put("k", json!({"ok": true}));
        // Still served from memory even though the write failed.
        assert_eq!(store.get("k"), Some(json!({"ok": true})));
    }

    #[test]
    fn test_clear() {
        let (store, backend, _clock) = memory_store();
        store.put("b", json!(2));
        store.put("a", json!(1));
        assert_eq!(store.keys(), vec!["a", "b"]);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(backend.contents().as_deref(), Some("{}"));
    }

    #[test]
    fn test_open_survives_restart() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cache").join("weather-cache.json");

        {
            let store = CacheStore::open(&path, DEFAULT_TTL);
            store.put("geocode/direct:{\"limit\":\"5\",\"q\":\"Oslo\"}", json!([{"name": "Oslo"}]));
        }

        let reopened = CacheStore::open(&path, DEFAULT_TTL);
        assert_eq!(
            reopened.get("geocode/direct:{\"limit\":\"5\",\"q\":\"Oslo\"}"),
            Some(json!([{"name": "Oslo"}]))
        );
    }
}
