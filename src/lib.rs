//! Sharded lookup engine for a word-puzzle answer/clue corpus.
//!
//! The corpus is pre-partitioned offline into small JSON shards keyed by
//! answer length and first-letter bucket, and published to an object store
//! alongside a manifest. At query time only the shards relevant to a pattern
//! are fetched and scanned:
//!
//! - a literal-first pattern resolves to exactly one shard;
//! - a wildcard-first pattern fans out over every shard of that length,
//!   with early stopping to bound latency.
//!
//! Decoded shards and finalized result sets sit behind small bounded caches,
//! so repeated queries avoid refetching from the backend.

pub mod clues;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod results;
pub mod search;
pub mod shard;
pub mod storage;

pub use crate::config::Config;
pub use crate::error::EngineError;
pub use crate::manifest::Manifest;
pub use crate::pattern::{analyze, CompiledPattern, PatternAnalysis, SearchStrategy, WILDCARD};
pub use crate::search::Engine;
pub use crate::shard::{AnswerMatch, Shard, ShardId};
pub use crate::storage::{FsStorage, HttpStorage, MemoryStorage, Storage};
