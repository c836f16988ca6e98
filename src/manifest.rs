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

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::shard::ShardId;

/// Shard directory written by the offline build: maps answer length to a
/// first-letter bucket to the shard object's file name. Immutable once
/// loaded; corpus updates require a process restart.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub total_entries: u64,
    pub chunk_count: u64,
    pub build_time: DateTime<Utc>,
    // BTreeMap keeps candidate resolution order deterministic.
    pub chunks: BTreeMap<String, BTreeMap<String, String>>,
}

impl Manifest {
    /// Object key of the manifest under the given index prefix.
    pub fn object_key(prefix: &str) -> String {
        format!("{}/manifest.json", prefix)
    }

    /// Whether the directory has a shard for this (length, bucket) pair.
    pub fn has_bucket(&self, len: usize, bucket: char) -> bool {
        self.chunks
            .get(&len.to_string())
            .map(|buckets| buckets.contains_key(&bucket.to_string()))
            .unwrap_or(false)
    }

    /// Every shard registered for answers of the given length, in bucket
    /// order. Empty when the length bucket is absent.
    pub fn shards_for_len(&self, len: usize) -> Vec<ShardId> {
        let Some(buckets) = self.chunks.get(&len.to_string()) else {
            return Vec::new();
        };
        buckets
            .keys()
            .filter_map(|b| b.chars().next())
            .map(|bucket| ShardId { len, bucket })
            .collect()
    }
}
