//! Compression cache persisted between CLI runs.
//!
//! Each `brandlens analyze` is its own process, so summaries are kept in a
//! JSON file next to the config file. The file is rewritten after every
//! store; an unreadable file is treated as empty.

use brandlens_compressor::CompressorConfig;
use brandlens_domain::{CacheKey, CompressionCache, CompressionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// File name of the cache, stored beside `config.toml`
pub const CACHE_FILE_NAME: &str = "compression_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: CacheKey,
    value: CompressionResult,
    /// Seconds since the Unix epoch
    stored_at: u64,
}

/// Compression cache backed by a JSON file.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<HashMap<CacheKey, StoredEntry>>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl FileCache {
    /// Open the cache at `path`, with retention taken from `config`.
    pub fn open(path: impl Into<PathBuf>, config: &CompressorConfig) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable compression cache {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        debug!("Loaded {} cached compressions from {}", entries.len(), path.display());

        Self {
            path,
            entries: Mutex::new(entries),
            ttl: config.cache_ttl(),
            max_entries: config.cache_max_entries,
        }
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, StoredEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &StoredEntry, now: u64) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_sub(entry.stored_at) >= ttl.as_secs())
    }

    fn save(&self, entries: &HashMap<CacheKey, StoredEntry>) {
        let mut stored: Vec<&StoredEntry> = entries.values().collect();
        stored.sort_by_key(|entry| entry.stored_at);

        let written = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| {
                serde_json::to_string_pretty(&stored)
                    .map_err(std::io::Error::other)
                    .and_then(|json| fs::write(&self.path, json))
            });
        if let Err(e) = written {
            warn!("Failed to write compression cache {}: {}", self.path.display(), e);
        }
    }
}

impl CompressionCache for FileCache {
    fn get(&self, key: &CacheKey) -> Option<CompressionResult> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if self.is_expired(entry, unix_now()) {
            debug!("Cached compression {} expired", key);
            return None;
        }
        Some(entry.value.clone())
    }

    fn put(&self, key: CacheKey, value: CompressionResult) {
        let now = unix_now();
        let mut entries = self.lock();

        if entries.get(&key).is_some_and(|existing| !self.is_expired(existing, now)) {
            return;
        }

        entries.retain(|_, entry| !self.is_expired(entry, now));
        if let Some(max) = self.max_entries {
            while entries.len() >= max && !entries.contains_key(&key) {
                let Some(oldest) = entries
                    .values()
                    .min_by_key(|entry| entry.stored_at)
                    .map(|entry| entry.key.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key.clone(),
            StoredEntry {
                key,
                value,
                stored_at: now,
            },
        );
        self.save(&entries);
    }

    fn len(&self) -> usize {
        let now = unix_now();
        self.lock()
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count()
    }
}

fn load_entries(path: &Path) -> crate::Result<HashMap<CacheKey, StoredEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let stored: Vec<StoredEntry> = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(stored
        .into_iter()
        .map(|entry| (entry.key.clone(), entry))
        .collect())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandlens_compressor::cache_key;
    use tempfile::TempDir;

    fn summary(text: &str, compressed: &str) -> CompressionResult {
        CompressionResult::compressed(text, compressed, 0.4, 0.3)
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        let key = cache_key("long background", 0.4, "m");

        let cache = FileCache::open(&path, &CompressorConfig::default());
        assert!(cache.is_empty());
        cache.put(key.clone(), summary("long background", "short"));

        let reopened = FileCache::open(&path, &CompressorConfig::default());
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&key).unwrap().compressed, "short");
    }

    #[test]
    fn test_put_keeps_existing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::open(dir.path().join(CACHE_FILE_NAME), &CompressorConfig::default());
        let key = cache_key("t", 0.4, "m");

        cache.put(key.clone(), summary("t", "first"));
        cache.put(key.clone(), summary("t", "second"));
        assert_eq!(cache.get(&key).unwrap().compressed, "first");
    }

    #[test]
    fn test_unreadable_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let cache = FileCache::open(&path, &CompressorConfig::default());
        assert!(cache.is_empty());

        cache.put(cache_key("t", 0.4, "m"), summary("t", "s"));
        assert_eq!(FileCache::open(&path, &CompressorConfig::default()).len(), 1);
    }

    #[test]
    fn test_capacity_bound() {
        let dir = TempDir::new().unwrap();
        let config = CompressorConfig {
            cache_max_entries: Some(2),
            ..CompressorConfig::default()
        };
        let cache = FileCache::open(dir.path().join(CACHE_FILE_NAME), &config);

        for text in ["a", "b", "c"] {
            cache.put(cache_key(text, 0.4, "m"), summary(text, "s"));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_ttl_expires() {
        let dir = TempDir::new().unwrap();
        let config = CompressorConfig {
            cache_ttl_secs: Some(0),
            ..CompressorConfig::default()
        };
        let cache = FileCache::open(dir.path().join(CACHE_FILE_NAME), &config);
        let key = cache_key("t", 0.4, "m");

        cache.put(key.clone(), summary("t", "s"));
        assert!(cache.get(&key).is_none());
    }
}
