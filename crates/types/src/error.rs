use alloy::primitives::B256;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the persistence traits.
///
/// [`NotFound`] is the "no rows" sentinel the dispatch loops route flow on;
/// everything else is a backend failure.
///
/// [`NotFound`]: StoreError::NotFound
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The query matched no rows.
    #[error("no rows")]
    NotFound,
    /// The backing store failed.
    #[error(transparent)]
    Backend(BoxedError),
}

impl StoreError {
    /// Wrap a backend failure.
    pub fn backend<E: Into<BoxedError>>(err: E) -> Self {
        Self::Backend(err.into())
    }

    /// True if this is the "no rows" sentinel.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Errors returned by the node client.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport or node failure.
    #[error("node request failed: {0}")]
    Transport(#[source] BoxedError),
    /// A transaction referenced by a log is not known to the node.
    #[error("transaction {0} not found on node")]
    TransactionNotFound(B256),
}

impl FetchError {
    /// Wrap a transport failure.
    pub fn transport<E: Into<BoxedError>>(err: E) -> Self {
        Self::Transport(err.into())
    }
}

/// Errors syncing transactions referenced by freshly fetched logs.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Fetching a transaction from the node failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Persisting a transaction failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error returned by a storage transformer, tagged with how the dispatcher
/// should react.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The decoder has no metadata for this storage slot; the diff is marked
    /// `unrecognized` and may be revisited later.
    #[error("unrecognized storage key {key}")]
    KeyNotFound {
        /// The slot key the decoder could not map.
        key: B256,
    },
    /// A retryable failure; the diff stays pending.
    #[error("transient transform failure: {0}")]
    Transient(#[source] BoxedError),
    /// An unrecoverable failure.
    #[error("fatal transform failure: {0}")]
    Fatal(#[source] BoxedError),
}

impl TransformError {
    /// Wrap a retryable failure.
    pub fn transient<E: Into<BoxedError>>(err: E) -> Self {
        Self::Transient(err.into())
    }

    /// Wrap an unrecoverable failure.
    pub fn fatal<E: Into<BoxedError>>(err: E) -> Self {
        Self::Fatal(err.into())
    }

    /// The tag the dispatcher branches on.
    pub const fn kind(&self) -> TransformErrorKind {
        match self {
            Self::KeyNotFound { .. } => TransformErrorKind::KeyNotFound,
            Self::Transient(_) => TransformErrorKind::Transient,
            Self::Fatal(_) => TransformErrorKind::Fatal,
        }
    }
}

/// Dispatch tag of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformErrorKind {
    /// Decoder lacks metadata for the slot.
    KeyNotFound,
    /// Retryable.
    Transient,
    /// Unrecoverable.
    Fatal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_carry_their_dispatch_tag() {
        let key_not_found = TransformError::KeyNotFound { key: B256::ZERO };
        assert_eq!(key_not_found.kind(), TransformErrorKind::KeyNotFound);

        let transient = TransformError::transient("connection reset");
        assert_eq!(transient.kind(), TransformErrorKind::Transient);

        let fatal = TransformError::fatal("corrupt metadata");
        assert_eq!(fatal.kind(), TransformErrorKind::Fatal);
    }

    #[test]
    fn not_found_is_the_only_sentinel() {
        assert!(StoreError::NotFound.is_not_found());
        assert!(!StoreError::backend("io error").is_not_found());
    }
}
