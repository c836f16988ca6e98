use crate::shard::ShardId;
use thiserror::Error;

/// Engine-level error taxonomy.
///
/// Manifest failures are fatal to the query that hit them: nothing can be
/// resolved without a manifest. Shard-level failures are absorbed by the
/// search engine (the shard contributes zero matches) and never reach the
/// caller of a query operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("manifest object missing from storage")]
    ManifestUnavailable,

    #[error("manifest present but not decodable: {0}")]
    ManifestCorrupt(String),

    #[error("shard {0} not found in storage")]
    ShardNotFound(ShardId),

    #[error("shard {0} present but not decodable: {1}")]
    ShardCorrupt(ShardId, String),

    #[error("storage backend unavailable: {0}")]
    StorageUnavailable(String),
}
