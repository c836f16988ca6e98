// Copyright 2025 Clueshard Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;
use crate::pattern::sanitize_bucket;
use crate::storage::Storage;

/// Identity of one corpus partition. Stable and derivable from the answer
/// length and sanitized first character alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShardId {
    pub len: usize,
    pub bucket: char,
}

impl ShardId {
    /// Owning shard of a canonical (uppercase) answer.
    pub fn for_answer(answer: &str) -> Option<ShardId> {
        let first = answer.chars().next()?;
        Some(ShardId {
            len: answer.chars().count(),
            bucket: sanitize_bucket(first),
        })
    }

    /// Object key of this shard under the given index prefix.
    pub fn object_key(&self, prefix: &str) -> String {
        format!("{}/chunk_{}_{}.json", prefix, self.len, self.bucket)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk_{}_{}", self.len, self.bucket)
    }
}

/// One scored answer, both the shard wire entry and the search result type.
/// `count` is the corpus occurrence frequency, used only for ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMatch {
    pub answer: String,
    pub count: u64,
}

/// Decoded shard contents: every answer of one (length, bucket) partition
/// with its frequency, plus the clue lists keyed by answer. Read-only after
/// decode.
#[derive(Clone, Debug, Deserialize)]
pub struct Shard {
    pub answers: Vec<AnswerMatch>,
    #[serde(default)]
    pub clues: HashMap<String, Vec<String>>,
}

struct FifoInner {
    map: HashMap<ShardId, Arc<Shard>>,
    order: VecDeque<ShardId>,
}

/// Shard loader with a bounded decoded-shard cache.
///
/// Eviction is strictly oldest-inserted-first: a read does not refresh an
/// entry's position. Concurrent loads of the same id may both fetch; the
/// later insert wins, which is harmless since shard contents are immutable.
#[derive(Clone)]
pub struct ShardStore {
    storage: Arc<dyn Storage>,
    prefix: String,
    capacity: usize,
    inner: Arc<Mutex<FifoInner>>,
}

impl ShardStore {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<String>, capacity: usize) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            capacity,
            inner: Arc::new(Mutex::new(FifoInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Return the cached shard, or fetch and decode it on miss.
    pub async fn load(&self, id: ShardId) -> Result<Arc<Shard>, EngineError> {
        if let Some(shard) = self.inner.lock().map.get(&id).cloned() {
            tracing::debug!(shard = %id, "shard cache hit");
            return Ok(shard);
        }

        let key = id.object_key(&self.prefix);
        let bytes = self
            .storage
            .get(&key)
            .await
            .map_err(|e| EngineError::StorageUnavailable(e.to_string()))?
            .ok_or(EngineError::ShardNotFound(id))?;
        let shard: Shard = serde_json::from_slice(&bytes)
            .map_err(|e| EngineError::ShardCorrupt(id, e.to_string()))?;
        tracing::debug!(shard = %id, answers = shard.answers.len(), "shard fetched");

        let shard = Arc::new(shard);
        self.insert(id, shard.clone());
        Ok(shard)
    }

    fn insert(&self, id: ShardId, shard: Arc<Shard>) {
        let mut inner = self.inner.lock();
        if inner.map.insert(id, shard).is_none() {
            inner.order.push_back(id);
        }
        while inner.map.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
                tracing::debug!(shard = %oldest, "evicted oldest shard from cache");
            } else {
                break;
            }
        }
    }

    /// Number of shards currently resident.
    pub fn cached_len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Whether a shard is resident without touching storage.
    pub fn is_cached(&self, id: ShardId) -> bool {
        self.inner.lock().map.contains_key(&id)
    }
}
