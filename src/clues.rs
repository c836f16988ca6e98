use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::search::Engine;
use crate::shard::ShardId;

/// Drop duplicate clue strings, keeping first occurrences in order.
pub(crate) fn dedup_clues(clues: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique = Vec::new();
    for clue in clues {
        if seen.insert(clue.as_str()) {
            unique.push(clue.clone());
        }
    }
    unique
}

impl Engine {
    /// Return up to `max_clues` clues for a known answer, deduplicated and
    /// uniformly permuted (Fisher-Yates via `SliceRandom::shuffle`).
    ///
    /// Clue lookups degrade silently: a missing bucket, a manifest failure,
    /// or an unreadable shard all yield an empty list, never an error.
    pub async fn get_clues(&self, answer: &str, max_clues: usize) -> Vec<String> {
        let normalized = answer.trim().to_uppercase();
        let Some(id) = ShardId::for_answer(&normalized) else {
            return Vec::new();
        };

        let manifest = match self.ensure_manifest().await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(answer = %normalized, error = %e, "clue lookup without manifest");
                return Vec::new();
            }
        };
        if !manifest.has_bucket(id.len, id.bucket) {
            return Vec::new();
        }

        let shard = match self.store.load(id).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(shard = %id, error = %e, "clue lookup shard unreadable");
                return Vec::new();
            }
        };

        let Some(clues) = shard.clues.get(&normalized) else {
            return Vec::new();
        };
        let mut unique = dedup_clues(clues);
        unique.shuffle(&mut rand::thread_rng());
        unique.truncate(max_clues);
        unique
    }
}
