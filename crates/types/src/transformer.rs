use crate::{EventTransformerConfig, PersistedDiff, TransformError};
use alloy::primitives::B256;
use async_trait::async_trait;

/// A user-supplied decoder for storage diffs of a single contract.
///
/// Transformers are indexed by the keccak-256 of their watched contract
/// address, which is the key under which the node emits diffs.
#[async_trait]
pub trait StorageTransformer: Send + Sync {
    /// Keccak-256 of the watched contract address.
    fn hashed_address(&self) -> B256;

    /// Decode and persist one diff. The returned error's kind tells the
    /// dispatcher whether to mark the diff `unrecognized`, retry it, or
    /// abort.
    async fn execute(&self, diff: &PersistedDiff) -> Result<(), TransformError>;
}

/// A user-supplied decoder for event logs, registered with the log
/// extractor via its configuration.
pub trait EventTransformer: Send + Sync {
    /// The subscription this transformer wants the extractor to service.
    fn config(&self) -> &EventTransformerConfig;
}
