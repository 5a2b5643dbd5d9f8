//! End-to-end tests for the log extractor over mock stores.

use alloy::primitives::{address, b256, Address, B256};
use dragnet_extract::{ExtractError, LogExtractor, HEADER_CHUNK_SIZE, RECHECK_HEADER_CAP};
use dragnet_test_utils::{
    fake_header, fake_log, MockCheckedHeaderStore, MockCheckedLogStore, MockEventLogStore,
    MockHeaderStore, MockLogFetcher, MockTransactionSyncer,
};
use dragnet_types::{EventTransformerConfig, ExtractionMode};
use std::sync::Arc;

const WATCHED: Address = address!("00000000000000000000000000000000000000aa");
const TOPIC: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000ee");

struct Harness {
    fetcher: Arc<MockLogFetcher>,
    syncer: Arc<MockTransactionSyncer>,
    headers: Arc<MockHeaderStore>,
    checked_headers: Arc<MockCheckedHeaderStore>,
    event_logs: Arc<MockEventLogStore>,
    extractor: LogExtractor,
}

impl Harness {
    fn new() -> Self {
        let fetcher = Arc::new(MockLogFetcher::default());
        let syncer = Arc::new(MockTransactionSyncer::default());
        let headers = Arc::new(MockHeaderStore::default());
        let checked_headers = Arc::new(MockCheckedHeaderStore::default());
        let event_logs = Arc::new(MockEventLogStore::default());
        let extractor = LogExtractor::new(
            fetcher.clone(),
            syncer.clone(),
            headers.clone(),
            checked_headers.clone(),
            Arc::new(MockCheckedLogStore::default()),
            event_logs.clone(),
        );
        Self { fetcher, syncer, headers, checked_headers, event_logs, extractor }
    }

    async fn watch(&mut self, starting_block: i64, ending_block: i64) {
        self.extractor
            .add_transformer_config(EventTransformerConfig::single(
                WATCHED,
                TOPIC,
                starting_block,
                ending_block,
            ))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn persists_logs_and_increments_check_count_once_per_header() {
    let mut harness = Harness::new();
    harness.watch(1, EventTransformerConfig::UNBOUNDED).await;

    let header = fake_header(7, 100, None);
    harness.fetcher.set_logs(header.hash, vec![fake_log(WATCHED, TOPIC, header.hash, 0)]);
    harness.checked_headers.push_round(vec![header.clone()]);

    harness.extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap();

    // transactions were synced before the logs were upserted
    assert_eq!(harness.syncer.calls.lock().unwrap().as_slice(), &[(7, 1)]);
    let batches = harness.event_logs.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].0, 7);
    assert_eq!(batches[0].1.len(), 1);
    // the check count moved exactly once
    assert_eq!(harness.checked_headers.checked.lock().unwrap().as_slice(), &[7]);
}

#[tokio::test]
async fn unchecked_mode_selects_headers_below_a_cap_of_one() {
    let mut harness = Harness::new();
    harness.watch(50, 200).await;
    harness.checked_headers.push_round(vec![]);

    let err = harness.extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap_err();
    assert!(err.is_no_unchecked_headers());
    assert_eq!(harness.checked_headers.calls.lock().unwrap().as_slice(), &[(50, 200, 1)]);
}

#[tokio::test]
async fn recheck_mode_selects_headers_below_the_recheck_cap() {
    let mut harness = Harness::new();
    harness.watch(50, EventTransformerConfig::UNBOUNDED).await;
    harness.checked_headers.push_round(vec![]);

    let _ = harness.extractor.extract_logs(ExtractionMode::Recheck).await;
    assert_eq!(
        harness.checked_headers.calls.lock().unwrap().as_slice(),
        &[(50, -1, RECHECK_HEADER_CAP)]
    );
}

#[tokio::test]
async fn headers_without_matching_logs_are_still_marked_checked() {
    let mut harness = Harness::new();
    harness.watch(1, EventTransformerConfig::UNBOUNDED).await;

    let header = fake_header(3, 42, None);
    harness.checked_headers.push_round(vec![header]);

    harness.extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap();

    assert!(harness.syncer.calls.lock().unwrap().is_empty());
    assert!(harness.event_logs.batches.lock().unwrap().is_empty());
    assert_eq!(harness.checked_headers.checked.lock().unwrap().as_slice(), &[3]);
}

#[tokio::test]
async fn fetch_failure_leaves_the_header_unchecked() {
    let mut harness = Harness::new();
    harness.watch(1, EventTransformerConfig::UNBOUNDED).await;

    harness.checked_headers.push_round(vec![fake_header(3, 42, None)]);
    harness.fetcher.fail();

    let err = harness.extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap_err();
    assert!(matches!(err, ExtractError::Fetch(_)));
    assert!(harness.checked_headers.checked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sync_failure_aborts_before_logs_or_check_counts_are_touched() {
    let mut harness = Harness::new();
    harness.watch(1, EventTransformerConfig::UNBOUNDED).await;

    let header = fake_header(9, 50, None);
    harness.fetcher.set_logs(header.hash, vec![fake_log(WATCHED, TOPIC, header.hash, 0)]);
    harness.checked_headers.push_round(vec![header]);
    harness.syncer.fail();

    let err = harness.extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap_err();
    assert!(matches!(err, ExtractError::Sync(_)));
    assert!(harness.event_logs.batches.lock().unwrap().is_empty());
    assert!(harness.checked_headers.checked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn back_fill_walks_chunks_without_touching_check_counts() {
    let mut harness = Harness::new();
    harness.watch(1, EventTransformerConfig::UNBOUNDED).await;

    let header = fake_header(11, 60_000, None);
    harness.headers.insert_header(header.clone());
    harness.fetcher.set_logs(header.hash, vec![fake_log(WATCHED, TOPIC, header.hash, 0)]);

    harness.extractor.back_fill_logs(HEADER_CHUNK_SIZE + 500).await.unwrap();

    // two chunk-sized windows were requested from the header store
    assert_eq!(
        harness.headers.range_calls.lock().unwrap().as_slice(),
        &[(1, HEADER_CHUNK_SIZE), (HEADER_CHUNK_SIZE + 1, HEADER_CHUNK_SIZE + 500)]
    );
    // the logs landed, but no check count moved
    assert_eq!(harness.event_logs.batches.lock().unwrap().len(), 1);
    assert!(harness.checked_headers.checked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn back_fill_rejects_an_ending_block_at_or_below_start() {
    let mut harness = Harness::new();
    harness.watch(500, EventTransformerConfig::UNBOUNDED).await;

    let err = harness.extractor.back_fill_logs(500).await.unwrap_err();
    assert!(matches!(err, ExtractError::InvalidRange { lower: 500, upper: 500 }));
}

#[tokio::test]
async fn back_fill_requires_a_registered_config() {
    let harness = Harness::new();
    let err = harness.extractor.back_fill_logs(1000).await.unwrap_err();
    assert!(matches!(err, ExtractError::NoWatchedAddresses));
}
