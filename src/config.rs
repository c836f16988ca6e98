use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine tunables. The classification and early-stop values are heuristics
/// carried as configuration rather than hard invariants.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bounded shard cache size (decoded shards held in memory).
    pub shard_cache_capacity: usize,
    /// Bounded result cache size (finalized result sets).
    pub result_cache_capacity: usize,
    /// Age after which a cached result set is treated as a miss.
    pub result_ttl: Duration,
    /// Fan-out scanning stops once matches reach `multiplier * max_results`.
    pub early_stop_multiplier: usize,
    /// Wildcard-led patterns with more wildcards than this are high-cost.
    pub high_cost_wildcards: usize,
    /// Wildcard-led patterns with a higher wildcard ratio are high-cost.
    pub high_cost_ratio: f64,
    /// How many shard fetches the fan-out strategy keeps in flight at once.
    pub fanout_concurrency: usize,
    /// Key prefix under which the offline build publishes manifest and shards.
    pub index_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_cache_capacity: 10,
            result_cache_capacity: 100,
            result_ttl: Duration::from_secs(300),
            early_stop_multiplier: 2,
            high_cost_wildcards: 3,
            high_cost_ratio: 0.6,
            fanout_concurrency: 8,
            index_prefix: "chunked-indexes".to_string(),
        }
    }
}

/// Load and merge a Config from: defaults <- config file <- env vars.
/// Invalid values in either source are ignored rather than fatal.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = path {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            let v: toml::Value = toml::from_str(&s)?;
            if let Some(n) = v.get("shard_cache_capacity").and_then(|x| x.as_integer()) {
                cfg.shard_cache_capacity = n as usize;
            }
            if let Some(n) = v.get("result_cache_capacity").and_then(|x| x.as_integer()) {
                cfg.result_cache_capacity = n as usize;
            }
            if let Some(n) = v.get("result_ttl_seconds").and_then(|x| x.as_integer()) {
                cfg.result_ttl = Duration::from_secs(n as u64);
            }
            if let Some(n) = v.get("early_stop_multiplier").and_then(|x| x.as_integer()) {
                cfg.early_stop_multiplier = n as usize;
            }
            if let Some(n) = v.get("high_cost_wildcards").and_then(|x| x.as_integer()) {
                cfg.high_cost_wildcards = n as usize;
            }
            if let Some(f) = v.get("high_cost_ratio").and_then(|x| x.as_float()) {
                cfg.high_cost_ratio = f;
            }
            if let Some(n) = v.get("fanout_concurrency").and_then(|x| x.as_integer()) {
                cfg.fanout_concurrency = (n as usize).max(1);
            }
            if let Some(p) = v.get("index_prefix").and_then(|x| x.as_str()) {
                cfg.index_prefix = p.to_string();
            }
        }
    }

    // env vars override file
    if let Ok(s) = std::env::var("CLUESHARD_SHARD_CACHE_CAPACITY") {
        if let Ok(n) = s.parse::<usize>() {
            cfg.shard_cache_capacity = n;
        }
    }
    if let Ok(s) = std::env::var("CLUESHARD_RESULT_CACHE_CAPACITY") {
        if let Ok(n) = s.parse::<usize>() {
            cfg.result_cache_capacity = n;
        }
    }
    if let Ok(s) = std::env::var("CLUESHARD_RESULT_TTL_SECONDS") {
        if let Ok(n) = s.parse::<u64>() {
            cfg.result_ttl = Duration::from_secs(n);
        }
    }
    if let Ok(s) = std::env::var("CLUESHARD_INDEX_PREFIX") {
        cfg.index_prefix = s;
    }

    Ok(cfg)
}
