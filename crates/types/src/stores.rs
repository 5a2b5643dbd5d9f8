//! Capability traits over the persistence and node layers.
//!
//! The orchestrators (log extractor, watchers) hold these as trait objects,
//! which keeps the pipeline wiring acyclic and lets tests substitute mocks
//! for Postgres and the node.

use crate::{
    DiffStatus, FetchError, Header, PersistedDiff, RawStorageDiff, StoreError, SyncError,
    TransactionRecord,
};
use alloy::{
    primitives::{Address, B256},
    rpc::types::Log,
};
use async_trait::async_trait;

/// Canonical header rows and range queries.
#[async_trait]
pub trait HeaderStore: Send + Sync {
    /// The canonical header for a block number, or [`StoreError::NotFound`]
    /// if the block has not been synced.
    async fn get_header(&self, block_number: i64) -> Result<Header, StoreError>;

    /// All headers with `block_number` in `[start, end]`, ascending.
    async fn headers_in_range(&self, start: i64, end: i64) -> Result<Vec<Header>, StoreError>;

    /// The highest synced block number, or [`StoreError::NotFound`] if no
    /// headers exist.
    async fn most_recent_block_number(&self) -> Result<i64, StoreError>;
}

/// Per-header check-count bookkeeping for the log extractor.
#[async_trait]
pub trait CheckedHeaderStore: Send + Sync {
    /// Headers in `[starting_block, ending_block]` with
    /// `check_count < check_count_cap`, ascending by block number.
    /// `ending_block = -1` means unbounded.
    async fn unchecked_headers(
        &self,
        starting_block: i64,
        ending_block: i64,
        check_count_cap: i64,
    ) -> Result<Vec<Header>, StoreError>;

    /// Atomically increment the header's check count, creating the row at
    /// count 1 if the header has never been checked.
    async fn mark_header_checked(&self, header_id: i64) -> Result<(), StoreError>;

    /// Reset the check count for the header at the given block number to 0.
    async fn mark_single_header_unchecked(&self, block_number: i64) -> Result<(), StoreError>;
}

/// The set of `(addresses, topic0)` pairs ever subscribed to.
#[async_trait]
pub trait CheckedLogStore: Send + Sync {
    /// True if this subscription has been recorded before.
    async fn already_watching(
        &self,
        addresses: &[Address],
        topic0: B256,
    ) -> Result<bool, StoreError>;

    /// Record the subscription. Idempotent.
    async fn mark_watched(&self, addresses: &[Address], topic0: B256) -> Result<(), StoreError>;
}

/// Raw event-log persistence.
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Upsert fetched logs for a header, keyed on
    /// `(block_hash, tx_index, log_index)`.
    async fn create_event_logs(&self, header_id: i64, logs: &[Log]) -> Result<(), StoreError>;
}

/// The append-only queue of raw storage diffs.
#[async_trait]
pub trait StorageDiffStore: Send + Sync {
    /// Insert a raw diff, returning its queue id. A duplicate insert
    /// conflicts silently and yields [`StoreError::NotFound`].
    async fn create_diff(&self, raw: RawStorageDiff) -> Result<i64, StoreError>;

    /// Insert a back-filled storage value, honoring the no-information-loss
    /// rules: a value already recorded for the slot at an earlier block, or
    /// a zero value with no prior non-zero diff, is a silent no-op.
    async fn create_back_filled_value(&self, raw: RawStorageDiff) -> Result<(), StoreError>;

    /// Up to `limit` diffs with the given status and `id > min_id`,
    /// ascending by id.
    async fn get_diffs(
        &self,
        status: DiffStatus,
        min_id: i64,
        limit: i64,
    ) -> Result<Vec<PersistedDiff>, StoreError>;

    /// The smallest diff id at `block_height >= height`, or
    /// [`StoreError::NotFound`] if none.
    async fn first_diff_id_for_block_height(&self, height: i64) -> Result<i64, StoreError>;

    /// Set the diff's status to `transformed` and attach the header id.
    async fn mark_transformed(&self, id: i64, header_id: i64) -> Result<(), StoreError>;

    /// Set the diff's status to `noncanonical`.
    async fn mark_noncanonical(&self, id: i64) -> Result<(), StoreError>;

    /// Set the diff's status to `unrecognized`.
    async fn mark_unrecognized(&self, id: i64) -> Result<(), StoreError>;

    /// Set the diff's status to `unwatched`.
    async fn mark_unwatched(&self, id: i64) -> Result<(), StoreError>;
}

/// Transaction rows referenced by persisted logs.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Upsert transactions for a header, keyed on `(header_id, hash)`.
    async fn create_transactions(
        &self,
        header_id: i64,
        transactions: &[TransactionRecord],
    ) -> Result<(), StoreError>;
}

/// `eth_getLogs` over a set of addresses and topic0 hashes.
#[async_trait]
pub trait LogFetcher: Send + Sync {
    /// Fetch logs emitted in the block with the given hash that match any of
    /// the addresses and any of the topic0 hashes.
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &[B256],
        block_hash: B256,
    ) -> Result<Vec<Log>, FetchError>;
}

/// Fetches and persists transactions whose hashes appear in fetched logs.
#[async_trait]
pub trait TransactionSyncer: Send + Sync {
    /// Sync the transactions referenced by `logs` for the given header.
    async fn sync_transactions(&self, header_id: i64, logs: &[Log]) -> Result<(), SyncError>;
}
