use alloy::{
    primitives::{Address, B256},
    rpc::types::Log,
};
use async_trait::async_trait;
use dragnet_types::{
    CheckedHeaderStore, CheckedLogStore, DiffStatus, EventLogStore, FetchError, Header,
    HeaderStore, LogFetcher, PersistedDiff, StorageDiffStore, StorageTransformer, StoreError,
    SyncError, TransactionRecord, TransactionStore, TransactionSyncer, TransformError,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

fn exhausted() -> StoreError {
    StoreError::backend("mock script exhausted")
}

/// In-memory header store keyed by block number.
#[derive(Debug, Default)]
pub struct MockHeaderStore {
    headers: Mutex<HashMap<i64, Header>>,
    head: Mutex<Option<i64>>,
    /// Recorded `headers_in_range` calls.
    pub range_calls: Mutex<Vec<(i64, i64)>>,
}

impl MockHeaderStore {
    /// Insert (or replace) the canonical header for its block number.
    pub fn insert_header(&self, header: Header) {
        self.headers.lock().unwrap().insert(header.block_number, header);
    }

    /// Set the head block number returned by `most_recent_block_number`.
    pub fn set_head(&self, head: i64) {
        *self.head.lock().unwrap() = Some(head);
    }
}

#[async_trait]
impl HeaderStore for MockHeaderStore {
    async fn get_header(&self, block_number: i64) -> Result<Header, StoreError> {
        self.headers.lock().unwrap().get(&block_number).cloned().ok_or(StoreError::NotFound)
    }

    async fn headers_in_range(&self, start: i64, end: i64) -> Result<Vec<Header>, StoreError> {
        self.range_calls.lock().unwrap().push((start, end));
        let mut headers: Vec<Header> = self
            .headers
            .lock()
            .unwrap()
            .values()
            .filter(|header| header.block_number >= start && header.block_number <= end)
            .cloned()
            .collect();
        headers.sort_by_key(|header| header.block_number);
        Ok(headers)
    }

    async fn most_recent_block_number(&self) -> Result<i64, StoreError> {
        self.head.lock().unwrap().ok_or(StoreError::NotFound)
    }
}

/// Scripted checked-header store: each `unchecked_headers` call pops one
/// prepared round; an exhausted script fails the call.
#[derive(Debug, Default)]
pub struct MockCheckedHeaderStore {
    rounds: Mutex<VecDeque<Vec<Header>>>,
    /// Recorded `(starting_block, ending_block, check_count_cap)` arguments.
    pub calls: Mutex<Vec<(i64, i64, i64)>>,
    /// Header ids passed to `mark_header_checked`, in order.
    pub checked: Mutex<Vec<i64>>,
    /// Block numbers passed to `mark_single_header_unchecked`.
    pub reset_blocks: Mutex<Vec<i64>>,
}

impl MockCheckedHeaderStore {
    /// Queue one `unchecked_headers` response.
    pub fn push_round(&self, headers: Vec<Header>) {
        self.rounds.lock().unwrap().push_back(headers);
    }
}

#[async_trait]
impl CheckedHeaderStore for MockCheckedHeaderStore {
    async fn unchecked_headers(
        &self,
        starting_block: i64,
        ending_block: i64,
        check_count_cap: i64,
    ) -> Result<Vec<Header>, StoreError> {
        self.calls.lock().unwrap().push((starting_block, ending_block, check_count_cap));
        self.rounds.lock().unwrap().pop_front().ok_or_else(exhausted)
    }

    async fn mark_header_checked(&self, header_id: i64) -> Result<(), StoreError> {
        self.checked.lock().unwrap().push(header_id);
        Ok(())
    }

    async fn mark_single_header_unchecked(&self, block_number: i64) -> Result<(), StoreError> {
        self.reset_blocks.lock().unwrap().push(block_number);
        Ok(())
    }
}

/// Checked-log store that records subscriptions.
#[derive(Debug, Default)]
pub struct MockCheckedLogStore {
    /// Subscriptions recorded via `mark_watched`.
    pub watched: Mutex<Vec<(Vec<Address>, B256)>>,
}

#[async_trait]
impl CheckedLogStore for MockCheckedLogStore {
    async fn already_watching(
        &self,
        addresses: &[Address],
        topic0: B256,
    ) -> Result<bool, StoreError> {
        let watched = self.watched.lock().unwrap();
        Ok(watched.iter().any(|(a, t)| a == addresses && *t == topic0))
    }

    async fn mark_watched(&self, addresses: &[Address], topic0: B256) -> Result<(), StoreError> {
        self.watched.lock().unwrap().push((addresses.to_vec(), topic0));
        Ok(())
    }
}

/// Event-log store that records upsert batches.
#[derive(Debug, Default)]
pub struct MockEventLogStore {
    /// `(header_id, logs)` batches passed to `create_event_logs`.
    pub batches: Mutex<Vec<(i64, Vec<Log>)>>,
}

#[async_trait]
impl EventLogStore for MockEventLogStore {
    async fn create_event_logs(&self, header_id: i64, logs: &[Log]) -> Result<(), StoreError> {
        self.batches.lock().unwrap().push((header_id, logs.to_vec()));
        Ok(())
    }
}

/// Scripted storage-diff queue.
#[derive(Debug, Default)]
pub struct MockStorageDiffStore {
    rounds: Mutex<VecDeque<Vec<PersistedDiff>>>,
    first_diff_ids: Mutex<HashMap<i64, i64>>,
    /// Recorded `(status, min_id, limit)` arguments to `get_diffs`.
    pub get_diffs_calls: Mutex<Vec<(DiffStatus, i64, i64)>>,
    /// Terminal statuses written per diff id; `mark_transformed` also
    /// records the header id.
    pub statuses: Mutex<Vec<(i64, DiffStatus, Option<i64>)>>,
}

impl MockStorageDiffStore {
    /// Queue one `get_diffs` response.
    pub fn push_round(&self, diffs: Vec<PersistedDiff>) {
        self.rounds.lock().unwrap().push_back(diffs);
    }

    /// Script the id returned by `first_diff_id_for_block_height`.
    pub fn set_first_diff_id(&self, height: i64, id: i64) {
        self.first_diff_ids.lock().unwrap().insert(height, id);
    }
}

#[async_trait]
impl StorageDiffStore for MockStorageDiffStore {
    async fn create_diff(&self, _raw: dragnet_types::RawStorageDiff) -> Result<i64, StoreError> {
        unimplemented!("the watchers never create diffs")
    }

    async fn create_back_filled_value(
        &self,
        _raw: dragnet_types::RawStorageDiff,
    ) -> Result<(), StoreError> {
        unimplemented!("the watchers never create diffs")
    }

    async fn get_diffs(
        &self,
        status: DiffStatus,
        min_id: i64,
        limit: i64,
    ) -> Result<Vec<PersistedDiff>, StoreError> {
        self.get_diffs_calls.lock().unwrap().push((status, min_id, limit));
        self.rounds.lock().unwrap().pop_front().ok_or_else(exhausted)
    }

    async fn first_diff_id_for_block_height(&self, height: i64) -> Result<i64, StoreError> {
        self.first_diff_ids.lock().unwrap().get(&height).copied().ok_or(StoreError::NotFound)
    }

    async fn mark_transformed(&self, id: i64, header_id: i64) -> Result<(), StoreError> {
        self.statuses.lock().unwrap().push((id, DiffStatus::Transformed, Some(header_id)));
        Ok(())
    }

    async fn mark_noncanonical(&self, id: i64) -> Result<(), StoreError> {
        self.statuses.lock().unwrap().push((id, DiffStatus::Noncanonical, None));
        Ok(())
    }

    async fn mark_unrecognized(&self, id: i64) -> Result<(), StoreError> {
        self.statuses.lock().unwrap().push((id, DiffStatus::Unrecognized, None));
        Ok(())
    }

    async fn mark_unwatched(&self, id: i64) -> Result<(), StoreError> {
        self.statuses.lock().unwrap().push((id, DiffStatus::Unwatched, None));
        Ok(())
    }
}

/// Transaction store that records upsert batches.
#[derive(Debug, Default)]
pub struct MockTransactionStore {
    /// `(header_id, records)` batches passed to `create_transactions`.
    pub batches: Mutex<Vec<(i64, Vec<TransactionRecord>)>>,
}

#[async_trait]
impl TransactionStore for MockTransactionStore {
    async fn create_transactions(
        &self,
        header_id: i64,
        transactions: &[TransactionRecord],
    ) -> Result<(), StoreError> {
        self.batches.lock().unwrap().push((header_id, transactions.to_vec()));
        Ok(())
    }
}

/// Log fetcher serving canned responses keyed by block hash.
#[derive(Debug, Default)]
pub struct MockLogFetcher {
    logs: Mutex<HashMap<B256, Vec<Log>>>,
    fail: Mutex<bool>,
    /// Recorded `(addresses, topics, block_hash)` arguments.
    pub calls: Mutex<Vec<(Vec<Address>, Vec<B256>, B256)>>,
}

impl MockLogFetcher {
    /// Serve the given logs for a block hash.
    pub fn set_logs(&self, block_hash: B256, logs: Vec<Log>) {
        self.logs.lock().unwrap().insert(block_hash, logs);
    }

    /// Make every subsequent fetch fail.
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl LogFetcher for MockLogFetcher {
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &[B256],
        block_hash: B256,
    ) -> Result<Vec<Log>, FetchError> {
        self.calls.lock().unwrap().push((addresses.to_vec(), topics.to_vec(), block_hash));
        if *self.fail.lock().unwrap() {
            return Err(FetchError::transport("mock fetch failure"));
        }
        Ok(self.logs.lock().unwrap().get(&block_hash).cloned().unwrap_or_default())
    }
}

/// Transaction syncer that records calls and optionally fails.
#[derive(Debug, Default)]
pub struct MockTransactionSyncer {
    fail: Mutex<bool>,
    /// `(header_id, log_count)` per call.
    pub calls: Mutex<Vec<(i64, usize)>>,
}

impl MockTransactionSyncer {
    /// Make every subsequent sync fail.
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl TransactionSyncer for MockTransactionSyncer {
    async fn sync_transactions(&self, header_id: i64, logs: &[Log]) -> Result<(), SyncError> {
        self.calls.lock().unwrap().push((header_id, logs.len()));
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Fetch(FetchError::transport("mock sync failure")));
        }
        Ok(())
    }
}

/// How a [`MockStorageTransformer`] responds to `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformBehavior {
    /// Succeed.
    Succeed,
    /// Report a slot key the decoder has no metadata for.
    KeyNotFound,
    /// Fail in a retryable way.
    Transient,
    /// Fail fatally.
    Fatal,
}

/// Storage transformer with a scripted outcome.
#[derive(Debug)]
pub struct MockStorageTransformer {
    hashed_address: B256,
    behavior: TransformBehavior,
    /// Diffs passed to `execute`, with whatever `header_id` the dispatcher
    /// resolved.
    pub executed: Mutex<Vec<PersistedDiff>>,
}

impl MockStorageTransformer {
    /// Create a transformer for the given hashed address.
    pub const fn new(hashed_address: B256, behavior: TransformBehavior) -> Self {
        Self { hashed_address, behavior, executed: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl StorageTransformer for MockStorageTransformer {
    fn hashed_address(&self) -> B256 {
        self.hashed_address
    }

    async fn execute(&self, diff: &PersistedDiff) -> Result<(), TransformError> {
        self.executed.lock().unwrap().push(*diff);
        match self.behavior {
            TransformBehavior::Succeed => Ok(()),
            TransformBehavior::KeyNotFound => {
                Err(TransformError::KeyNotFound { key: diff.raw.storage_key })
            }
            TransformBehavior::Transient => Err(TransformError::transient("mock transient")),
            TransformBehavior::Fatal => Err(TransformError::fatal("mock fatal")),
        }
    }
}
