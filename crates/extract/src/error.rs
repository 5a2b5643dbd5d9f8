use dragnet_types::{FetchError, StoreError, SyncError};

/// Errors surfaced by the log extractor.
///
/// [`NoUncheckedHeaders`] and [`NoWatchedAddresses`] are sentinels: the
/// supervisor treats the former as "sleep and poll again" and the latter as
/// a configuration error, not a runtime failure.
///
/// [`NoUncheckedHeaders`]: ExtractError::NoUncheckedHeaders
/// [`NoWatchedAddresses`]: ExtractError::NoWatchedAddresses
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Extraction was invoked before any transformer config was registered.
    #[error("no watched addresses configured")]
    NoWatchedAddresses,
    /// Every candidate header in range is already checked.
    #[error("no unchecked headers available")]
    NoUncheckedHeaders,
    /// Looking up whether a subscription was already recorded failed.
    #[error("failed to look up subscription: {0}")]
    CheckedLogLookup(#[source] StoreError),
    /// Recording a new subscription failed.
    #[error("failed to record subscription: {0}")]
    CheckedLogWrite(#[source] StoreError),
    /// Fetching logs from the node failed.
    #[error("failed to fetch logs: {0}")]
    Fetch(#[from] FetchError),
    /// Syncing transactions referenced by fetched logs failed.
    #[error("failed to sync transactions: {0}")]
    Sync(#[from] SyncError),
    /// A header or event-log store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A back-fill range whose upper bound is not above its lower bound.
    #[error("invalid back-fill range: upper bound {upper} not above lower bound {lower}")]
    InvalidRange {
        /// Lower bound of the rejected range.
        lower: i64,
        /// Upper bound of the rejected range.
        upper: i64,
    },
}

impl ExtractError {
    /// True for the "nothing to do right now" sentinel.
    pub const fn is_no_unchecked_headers(&self) -> bool {
        matches!(self, Self::NoUncheckedHeaders)
    }
}
