use alloy::primitives::B256;

/// A canonical block header row.
///
/// Headers are identified in-store by a surrogate id and externally by
/// `(block_number, block_hash)`. A reorg produces a new row for the same
/// block number; rows are never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Surrogate id assigned by the store.
    pub id: i64,
    /// Block number.
    pub block_number: i64,
    /// Block hash.
    pub hash: B256,
    /// Raw header JSON as returned by the node, if captured.
    pub raw: Option<serde_json::Value>,
}

impl Header {
    /// Create a header row with no raw payload.
    pub const fn new(id: i64, block_number: i64, hash: B256) -> Self {
        Self { id, block_number, hash, raw: None }
    }
}
