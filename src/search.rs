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

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::EngineError;
use crate::manifest::Manifest;
use crate::pattern::{self, CompiledPattern, PatternAnalysis, SearchStrategy};
use crate::results::ResultCache;
use crate::shard::{AnswerMatch, ShardId, ShardStore};
use crate::storage::Storage;

/// Query engine over the sharded answer/clue corpus.
///
/// Constructed once at process start and shared by handle; holds the storage
/// backend, the once-per-process manifest, and both bounded caches. All
/// state is read-mostly: the only mutation is cache insert/evict.
pub struct Engine {
    config: Config,
    storage: Arc<dyn Storage>,
    pub(crate) store: ShardStore,
    manifest: OnceCell<Manifest>,
    results: ResultCache,
}

impl Engine {
    pub fn new(storage: Arc<dyn Storage>, config: Config) -> Self {
        let store = ShardStore::new(
            storage.clone(),
            config.index_prefix.clone(),
            config.shard_cache_capacity,
        );
        let results = ResultCache::new(config.result_cache_capacity, config.result_ttl);
        Self {
            config,
            storage,
            store,
            manifest: OnceCell::new(),
            results,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decoded shards currently resident in the shard cache.
    pub fn cached_shards(&self) -> usize {
        self.store.cached_len()
    }

    /// Result sets currently resident in the result cache.
    pub fn cached_results(&self) -> usize {
        self.results.len()
    }

    /// Fetch and decode the manifest exactly once per process. Concurrent
    /// first callers share one fetch; after the first success every call is
    /// a no-op returning the resident copy. A failed first load is retried
    /// on the next call.
    pub async fn ensure_manifest(&self) -> Result<&Manifest, EngineError> {
        self.manifest
            .get_or_try_init(|| async {
                let key = Manifest::object_key(&self.config.index_prefix);
                let bytes = self
                    .storage
                    .get(&key)
                    .await
                    .map_err(|e| EngineError::StorageUnavailable(e.to_string()))?
                    .ok_or(EngineError::ManifestUnavailable)?;
                let manifest: Manifest = serde_json::from_slice(&bytes)
                    .map_err(|e| EngineError::ManifestCorrupt(e.to_string()))?;
                tracing::info!(
                    total_entries = manifest.total_entries,
                    chunk_count = manifest.chunk_count,
                    "manifest loaded"
                );
                Ok(manifest)
            })
            .await
    }

    /// Classify a pattern and report which strategy a search would take.
    /// Normalizes to uppercase first, same as `find_matching_answers`.
    pub fn analyze_pattern(&self, pattern: &str) -> PatternAnalysis {
        pattern::analyze(&pattern.trim().to_uppercase(), &self.config)
    }

    /// Find all known answers matching `pattern` (letters and `?`,
    /// case-insensitive), sorted by corpus frequency descending with a
    /// lexicographic tie-break, truncated to `max_results`.
    ///
    /// Manifest failures propagate; per-shard failures are logged and the
    /// shard contributes zero matches, so a query with unreachable shards
    /// returns a partial (possibly empty) result set.
    pub async fn find_matching_answers(
        &self,
        pattern: &str,
        max_results: usize,
    ) -> Result<Vec<AnswerMatch>, EngineError> {
        let normalized = pattern.trim().to_uppercase();

        if let Some(mut hit) = self.results.get(&normalized) {
            tracing::debug!(pattern = %normalized, "result cache hit");
            hit.truncate(max_results);
            return Ok(hit);
        }

        let manifest = self.ensure_manifest().await?;
        let analysis = pattern::analyze(&normalized, &self.config);
        let candidates = self.resolve_candidates(manifest, &normalized, &analysis);
        tracing::debug!(
            pattern = %normalized,
            strategy = ?analysis.search_strategy,
            candidates = candidates.len(),
            "searching"
        );

        let matcher = CompiledPattern::compile(&normalized);
        let mut matches = match analysis.search_strategy {
            SearchStrategy::Direct => self.scan_direct(&candidates, &matcher).await,
            SearchStrategy::ParallelOptimized => {
                let budget = self.config.early_stop_multiplier.saturating_mul(max_results);
                self.scan_fanout(&candidates, &matcher, budget).await
            }
        };

        matches.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.answer.cmp(&b.answer)));
        matches.truncate(max_results);
        self.results.put(&normalized, &matches);
        Ok(matches)
    }

    /// Candidate shard set for a normalized pattern: exactly one id when the
    /// first character is literal and that bucket exists, every id for the
    /// pattern's length when it starts with a wildcard, empty otherwise.
    fn resolve_candidates(
        &self,
        manifest: &Manifest,
        normalized: &str,
        analysis: &PatternAnalysis,
    ) -> Vec<ShardId> {
        let len = normalized.chars().count();
        if analysis.starts_with_wildcard {
            return manifest.shards_for_len(len);
        }
        let Some(first) = normalized.chars().next() else {
            return Vec::new();
        };
        let bucket = pattern::sanitize_bucket(first);
        if manifest.has_bucket(len, bucket) {
            vec![ShardId { len, bucket }]
        } else {
            Vec::new()
        }
    }

    /// Sequential scan in resolution order; every candidate shard is read.
    async fn scan_direct(&self, candidates: &[ShardId], matcher: &CompiledPattern) -> Vec<AnswerMatch> {
        let mut out = Vec::new();
        for &id in candidates {
            match self.store.load(id).await {
                Ok(shard) => {
                    out.extend(shard.answers.iter().filter(|m| matcher.is_match(&m.answer)).cloned());
                }
                Err(e) => {
                    tracing::warn!(shard = %id, error = %e, "skipping unreadable shard");
                }
            }
        }
        out
    }

    /// Concurrent fan-out with early stopping: shard loads run with bounded
    /// concurrency and are scanned in completion order, so the retained
    /// subset for a wildcard-heavy pattern is not deterministic across runs.
    /// Once accumulated matches reach `budget`, remaining shards are neither
    /// scanned nor fetched. Bounded latency is traded for completeness here;
    /// lower-ranked true matches can be missed.
    async fn scan_fanout(
        &self,
        candidates: &[ShardId],
        matcher: &CompiledPattern,
        budget: usize,
    ) -> Vec<AnswerMatch> {
        let mut loads = stream::iter(candidates.iter().copied())
            .map(|id| {
                let store = self.store.clone();
                async move { (id, store.load(id).await) }
            })
            .buffer_unordered(self.config.fanout_concurrency.max(1));

        let mut out = Vec::new();
        while let Some((id, result)) = loads.next().await {
            match result {
                Ok(shard) => {
                    out.extend(shard.answers.iter().filter(|m| matcher.is_match(&m.answer)).cloned());
                }
                Err(e) => {
                    tracing::warn!(shard = %id, error = %e, "skipping unreadable shard");
                }
            }
            if budget > 0 && out.len() >= budget {
                tracing::debug!(matches = out.len(), budget, "early stop before remaining shards");
                break;
            }
        }
        out
    }
}
