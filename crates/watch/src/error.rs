use alloy::primitives::B256;
use dragnet_extract::ExtractError;
use dragnet_types::{StoreError, TransformError};

/// Fatal errors that terminate a watcher loop.
///
/// Everything here is unrecoverable for the worker; transient conditions
/// (missing headers, in-window hash mismatches, retryable transformer
/// failures) are absorbed inside the loop and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Writing the health-check heartbeat failed.
    #[error("failed to write heartbeat: {0}")]
    Heartbeat(#[from] std::io::Error),
    /// A repository operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A transformer failed in a way tagged unrecoverable.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The log extractor failed and the retry budget is exhausted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Errors registering transformers with a watcher.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two storage transformers claim the same hashed contract address.
    #[error("duplicate storage transformer for hashed address {0}")]
    DuplicateAddress(B256),
}
