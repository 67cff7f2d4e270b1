//! Content-addressed memo store for summaries
//!
//! Keys are SHA-256 digests over the segment, the requested ratio and the
//! summarizer identity. Entries are pure memoizations of a deterministic
//! function, so eviction only costs a recomputation.

use brandlens_domain::{CacheKey, CompressionCache, CompressionResult};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Compute the cache key for compressing `text` at `ratio` with `model_id`
///
/// # Examples
///
/// ```
/// use brandlens_compressor::cache_key;
///
/// let a = cache_key("Some background.", 0.4, "lead-sentence");
/// assert_eq!(a, cache_key("Some background.", 0.4, "lead-sentence"));
/// assert_ne!(a, cache_key("Some background.", 0.5, "lead-sentence"));
/// assert_eq!(a.as_str().len(), 64);
/// ```
pub fn cache_key(text: &str, ratio: f64, model_id: &str) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0u8]);
    hasher.update(format!("{:.6}", ratio).as_bytes());
    hasher.update([0u8]);
    hasher.update(model_id.as_bytes());
    CacheKey::from_digest(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone)]
struct Entry {
    value: CompressionResult,
    stored_at: Instant,
    seq: u64,
}

/// Entries plus their insertion order
///
/// Entries are never updated in place, so insertion order is age order.
/// `order` may hold records of entries already removed or replaced; they
/// are recognised by a sequence number mismatch and skipped.
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<CacheKey, Entry>,
    order: VecDeque<(u64, CacheKey)>,
    next_seq: u64,
}

impl Entries {
    fn is_current(&self, seq: u64, key: &CacheKey) -> bool {
        self.map.get(key).is_some_and(|entry| entry.seq == seq)
    }

    /// Drop stale records and expired entries from the old end
    fn prune(&mut self, expired: impl Fn(&Entry) -> bool) {
        while let Some((seq, key)) = self.order.front() {
            let live = self.map.get(key).filter(|entry| entry.seq == *seq);
            if live.is_some_and(|entry| !expired(entry)) {
                break;
            }
            if live.is_some() {
                self.map.remove(key);
            }
            self.order.pop_front();
        }
    }

    /// Remove the oldest live entry
    fn evict_oldest(&mut self) -> bool {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.is_current(seq, &key) {
                debug!("Evicting cache entry {}", key);
                self.map.remove(&key);
                return true;
            }
        }
        false
    }

    fn insert(&mut self, key: CacheKey, value: CompressionResult) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.push_back((seq, key.clone()));
        self.map.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                seq,
            },
        );
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// In-process cache guarded by a mutex
///
/// Optional TTL and capacity bound; at capacity the oldest entry is evicted.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<Entries>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl InMemoryCache {
    /// Unbounded cache without expiry
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire entries after `ttl`
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Keep at most `max_entries` entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

impl CompressionCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CompressionResult> {
        let mut entries = self.lock();
        let expired = self.is_expired(entries.map.get(key)?);
        if expired {
            debug!("Cache entry {} expired", key);
            entries.map.remove(key);
            return None;
        }
        entries.map.get(key).map(|entry| entry.value.clone())
    }

    fn put(&self, key: CacheKey, value: CompressionResult) {
        let mut entries = self.lock();

        if let Some(existing) = entries.map.get(&key) {
            if !self.is_expired(existing) {
                return;
            }
        }

        entries.prune(|entry| self.is_expired(entry));
        if let Some(max) = self.max_entries {
            while entries.map.len() >= max && !entries.map.contains_key(&key) {
                if !entries.evict_oldest() {
                    break;
                }
            }
        }

        entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.lock()
            .map
            .values()
            .filter(|entry| !self.is_expired(entry))
            .count()
    }
}
