//! Supervision tests for the event watcher: sentinel handling, retry
//! budget, and heartbeat.

use alloy::primitives::{address, b256, Address, B256};
use dragnet_extract::LogExtractor;
use dragnet_test_utils::{
    fake_header, fake_log, MockCheckedHeaderStore, MockCheckedLogStore, MockEventLogStore,
    MockHeaderStore, MockLogFetcher, MockTransactionSyncer,
};
use dragnet_types::{EventTransformerConfig, ExtractionMode};
use dragnet_watch::{EventWatcher, RetryPolicy, StatusWriter, WatchError};
use std::{sync::Arc, time::Duration};

const WATCHED: Address = address!("00000000000000000000000000000000000000aa");
const TOPIC: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000ee");

fn policy() -> RetryPolicy {
    RetryPolicy { retry_interval: Duration::from_millis(1), max_consecutive_failures: 2 }
}

struct Harness {
    fetcher: Arc<MockLogFetcher>,
    checked_headers: Arc<MockCheckedHeaderStore>,
    event_logs: Arc<MockEventLogStore>,
    watcher: EventWatcher,
    dir: tempfile::TempDir,
}

impl Harness {
    async fn new() -> Self {
        let fetcher = Arc::new(MockLogFetcher::default());
        let checked_headers = Arc::new(MockCheckedHeaderStore::default());
        let event_logs = Arc::new(MockEventLogStore::default());
        let extractor = LogExtractor::new(
            fetcher.clone(),
            Arc::new(MockTransactionSyncer::default()),
            Arc::new(MockHeaderStore::default()),
            checked_headers.clone(),
            Arc::new(MockCheckedLogStore::default()),
            event_logs.clone(),
        );
        let dir = tempfile::tempdir().unwrap();
        let status_writer =
            StatusWriter::new(dir.path().join("health_check"), "event watcher starting\n");
        let mut watcher = EventWatcher::new(extractor, status_writer, policy());

        watcher
            .extractor_mut()
            .add_transformer_config(EventTransformerConfig::single(
                WATCHED,
                TOPIC,
                1,
                EventTransformerConfig::UNBOUNDED,
            ))
            .await
            .unwrap();

        Self { fetcher, checked_headers, event_logs, watcher, dir }
    }
}

#[tokio::test]
async fn extracts_until_the_retry_budget_is_exhausted() {
    let harness = Harness::new().await;

    // one productive round, one idle round, then the script runs dry and
    // every further attempt counts against the retry budget
    let header = fake_header(4, 10, None);
    harness.fetcher.set_logs(header.hash, vec![fake_log(WATCHED, TOPIC, header.hash, 0)]);
    harness.checked_headers.push_round(vec![header]);
    harness.checked_headers.push_round(vec![]);

    let err = harness.watcher.execute(ExtractionMode::Unchecked).await.unwrap_err();
    assert!(matches!(err, WatchError::Extract(_)));

    // the productive round landed its logs and check count
    assert_eq!(harness.event_logs.batches.lock().unwrap().len(), 1);
    assert_eq!(harness.checked_headers.checked.lock().unwrap().as_slice(), &[4]);
    // one call per scripted round plus two budget-consuming failures
    assert_eq!(harness.checked_headers.calls.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn writes_the_heartbeat_banner_before_extracting() {
    let harness = Harness::new().await;
    let _ = harness.watcher.execute(ExtractionMode::Unchecked).await;

    let banner = std::fs::read_to_string(harness.dir.path().join("health_check")).unwrap();
    assert_eq!(banner, "event watcher starting\n");
}
