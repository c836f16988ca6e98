use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::shard::AnswerMatch;

struct CachedResult {
    results: Vec<AnswerMatch>,
    stored_at: Instant,
}

/// Bounded, time-limited cache of finalized, sorted result sets keyed by
/// normalized pattern.
///
/// Expiry is checked on read, not by a background sweep; size eviction is
/// strictly oldest-inserted-first and independent of TTL. Values are cloned
/// on both insert and read so callers can never mutate the cached copy.
pub struct ResultCache {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
}

struct Inner {
    map: HashMap<String, CachedResult>,
    order: VecDeque<String>,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Fresh hit returns a copy of the stored results; a stale entry is
    /// removed and reported as a miss.
    pub fn get(&self, pattern: &str) -> Option<Vec<AnswerMatch>> {
        let mut inner = self.inner.lock();
        match inner.map.get(pattern) {
            None => return None,
            Some(entry) => {
                if entry.stored_at.elapsed() <= self.ttl {
                    return Some(entry.results.clone());
                }
            }
        }
        tracing::debug!(pattern, "expired result cache entry");
        inner.map.remove(pattern);
        inner.order.retain(|k| k != pattern);
        None
    }

    pub fn put(&self, pattern: &str, results: &[AnswerMatch]) {
        let mut inner = self.inner.lock();
        let entry = CachedResult {
            results: results.to_vec(),
            stored_at: Instant::now(),
        };
        if inner.map.insert(pattern.to_string(), entry).is_some() {
            // overwrite counts as a fresh insertion for eviction purposes
            inner.order.retain(|k| k != pattern);
        }
        inner.order.push_back(pattern.to_string());
        while inner.map.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().map.is_empty()
    }
}
