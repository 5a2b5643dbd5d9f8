use crate::{chunk_ranges, ExtractError};
use alloy::primitives::{Address, B256};
use dragnet_types::{
    CheckedHeaderStore, CheckedLogStore, EventLogStore, EventTransformerConfig, ExtractionMode,
    Header, HeaderStore, LogFetcher, TransactionSyncer,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Number of times a header may be re-checked for logs before the recheck
/// pass stops selecting it.
pub const RECHECK_HEADER_CAP: i64 = 30;

/// Width of the header windows the back-fill path walks.
pub const HEADER_CHUNK_SIZE: i64 = 100_000;

/// Drives event-log ingestion for a dynamically registered set of
/// transformer configurations.
///
/// Configurations are merged into one aggregate subscription: the union of
/// addresses and topic0 hashes, the minimum starting block, and an ending
/// block that is unbounded as soon as any config is.
pub struct LogExtractor {
    fetcher: Arc<dyn LogFetcher>,
    syncer: Arc<dyn TransactionSyncer>,
    headers: Arc<dyn HeaderStore>,
    checked_headers: Arc<dyn CheckedHeaderStore>,
    checked_logs: Arc<dyn CheckedLogStore>,
    event_logs: Arc<dyn EventLogStore>,

    addresses: Vec<Address>,
    topics: Vec<B256>,
    starting_block: Option<i64>,
    ending_block: Option<i64>,
}

impl std::fmt::Debug for LogExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogExtractor")
            .field("addresses", &self.addresses)
            .field("topics", &self.topics)
            .field("starting_block", &self.starting_block)
            .field("ending_block", &self.ending_block)
            .finish_non_exhaustive()
    }
}

impl LogExtractor {
    /// Create an extractor over the given stores and node client.
    pub fn new(
        fetcher: Arc<dyn LogFetcher>,
        syncer: Arc<dyn TransactionSyncer>,
        headers: Arc<dyn HeaderStore>,
        checked_headers: Arc<dyn CheckedHeaderStore>,
        checked_logs: Arc<dyn CheckedLogStore>,
        event_logs: Arc<dyn EventLogStore>,
    ) -> Self {
        Self {
            fetcher,
            syncer,
            headers,
            checked_headers,
            checked_logs,
            event_logs,
            addresses: Vec::new(),
            topics: Vec::new(),
            starting_block: None,
            ending_block: None,
        }
    }

    /// Union of all subscribed contract addresses.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Union of all subscribed topic0 hashes.
    pub fn topics(&self) -> &[B256] {
        &self.topics
    }

    /// Minimum starting block across registered configs.
    pub const fn starting_block(&self) -> Option<i64> {
        self.starting_block
    }

    /// Aggregated ending block; `-1` once any config is unbounded.
    pub const fn ending_block(&self) -> Option<i64> {
        self.ending_block
    }

    /// Register a transformer configuration.
    ///
    /// The `(addresses, topic0)` subscription is recorded permanently the
    /// first time it is seen, then the aggregate watch state is widened.
    pub async fn add_transformer_config(
        &mut self,
        config: EventTransformerConfig,
    ) -> Result<(), ExtractError> {
        let watching = self
            .checked_logs
            .already_watching(&config.contract_addresses, config.topic0)
            .await
            .map_err(ExtractError::CheckedLogLookup)?;
        if !watching {
            self.checked_logs
                .mark_watched(&config.contract_addresses, config.topic0)
                .await
                .map_err(ExtractError::CheckedLogWrite)?;
        }

        for address in &config.contract_addresses {
            if !self.addresses.contains(address) {
                self.addresses.push(*address);
            }
        }
        if !self.topics.contains(&config.topic0) {
            self.topics.push(config.topic0);
        }

        self.starting_block = Some(match self.starting_block {
            None => config.starting_block,
            Some(current) => current.min(config.starting_block),
        });
        self.ending_block = Some(match self.ending_block {
            None => config.ending_block,
            Some(EventTransformerConfig::UNBOUNDED) => EventTransformerConfig::UNBOUNDED,
            Some(_) if config.is_unbounded() => EventTransformerConfig::UNBOUNDED,
            Some(current) => current.max(config.ending_block),
        });

        debug!(
            addresses = self.addresses.len(),
            topics = self.topics.len(),
            starting_block = self.starting_block,
            ending_block = self.ending_block,
            "registered transformer config"
        );
        Ok(())
    }

    /// Fetch and persist logs for headers still below the mode's check cap,
    /// incrementing each processed header's check count.
    ///
    /// Returns the [`NoUncheckedHeaders`] sentinel when every header in the
    /// watched range is up to date.
    ///
    /// [`NoUncheckedHeaders`]: ExtractError::NoUncheckedHeaders
    #[instrument(skip(self))]
    pub async fn extract_logs(&self, mode: ExtractionMode) -> Result<(), ExtractError> {
        let (starting_block, ending_block) = self.watched_range()?;
        let check_count_cap = match mode {
            ExtractionMode::Unchecked => 1,
            ExtractionMode::Recheck => RECHECK_HEADER_CAP,
        };

        let headers = self
            .checked_headers
            .unchecked_headers(starting_block, ending_block, check_count_cap)
            .await?;
        if headers.is_empty() {
            return Err(ExtractError::NoUncheckedHeaders);
        }

        debug!(count = headers.len(), check_count_cap, "extracting logs for headers");
        for header in headers {
            self.extract_logs_for_header(&header).await?;
            self.checked_headers.mark_header_checked(header.id).await?;
        }
        Ok(())
    }

    /// Re-fetch logs across `[starting_block, end_block]` in
    /// [`HEADER_CHUNK_SIZE`] windows without touching check counts.
    ///
    /// Used after registering a new transformer against headers that were
    /// already marked checked for the previous subscription set.
    #[instrument(skip(self))]
    pub async fn back_fill_logs(&self, end_block: i64) -> Result<(), ExtractError> {
        let (starting_block, _) = self.watched_range()?;

        for range in chunk_ranges(starting_block, end_block, HEADER_CHUNK_SIZE)? {
            debug!(start = range.start, end = range.end, "back-filling chunk");
            let headers = self.headers.headers_in_range(range.start, range.end).await?;
            for header in headers {
                self.extract_logs_for_header(&header).await?;
            }
        }
        Ok(())
    }

    /// Fetch logs for one header, syncing referenced transactions before the
    /// logs are upserted so the rows they point at exist first.
    async fn extract_logs_for_header(&self, header: &Header) -> Result<(), ExtractError> {
        let logs = self.fetcher.fetch_logs(&self.addresses, &self.topics, header.hash).await?;
        if logs.is_empty() {
            return Ok(());
        }
        self.syncer.sync_transactions(header.id, &logs).await?;
        self.event_logs.create_event_logs(header.id, &logs).await?;
        Ok(())
    }

    fn watched_range(&self) -> Result<(i64, i64), ExtractError> {
        if self.addresses.is_empty() {
            return Err(ExtractError::NoWatchedAddresses);
        }
        match (self.starting_block, self.ending_block) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ExtractError::NoWatchedAddresses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};
    use async_trait::async_trait;
    use dragnet_types::StoreError;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingCheckedLogs {
        already_watching: bool,
        lookup_fails: bool,
        watched: Mutex<Vec<(Vec<Address>, B256)>>,
    }

    #[async_trait]
    impl CheckedLogStore for RecordingCheckedLogs {
        async fn already_watching(
            &self,
            _addresses: &[Address],
            _topic0: B256,
        ) -> Result<bool, StoreError> {
            if self.lookup_fails {
                return Err(StoreError::backend("lookup failed"));
            }
            Ok(self.already_watching)
        }

        async fn mark_watched(
            &self,
            addresses: &[Address],
            topic0: B256,
        ) -> Result<(), StoreError> {
            self.watched.lock().unwrap().push((addresses.to_vec(), topic0));
            Ok(())
        }
    }

    mod stubs {
        use super::*;
        use alloy::rpc::types::Log;
        use dragnet_types::{FetchError, SyncError};

        #[derive(Debug)]
        pub(super) struct Unreachable;

        #[async_trait]
        impl LogFetcher for Unreachable {
            async fn fetch_logs(
                &self,
                _: &[Address],
                _: &[B256],
                _: B256,
            ) -> Result<Vec<Log>, FetchError> {
                unreachable!("not exercised by config tests")
            }
        }

        #[async_trait]
        impl TransactionSyncer for Unreachable {
            async fn sync_transactions(&self, _: i64, _: &[Log]) -> Result<(), SyncError> {
                unreachable!("not exercised by config tests")
            }
        }

        #[async_trait]
        impl HeaderStore for Unreachable {
            async fn get_header(&self, _: i64) -> Result<Header, StoreError> {
                unreachable!("not exercised by config tests")
            }
            async fn headers_in_range(&self, _: i64, _: i64) -> Result<Vec<Header>, StoreError> {
                unreachable!("not exercised by config tests")
            }
            async fn most_recent_block_number(&self) -> Result<i64, StoreError> {
                unreachable!("not exercised by config tests")
            }
        }

        #[async_trait]
        impl CheckedHeaderStore for Unreachable {
            async fn unchecked_headers(
                &self,
                _: i64,
                _: i64,
                _: i64,
            ) -> Result<Vec<Header>, StoreError> {
                Ok(vec![])
            }
            async fn mark_header_checked(&self, _: i64) -> Result<(), StoreError> {
                unreachable!("not exercised by config tests")
            }
            async fn mark_single_header_unchecked(&self, _: i64) -> Result<(), StoreError> {
                unreachable!("not exercised by config tests")
            }
        }

        #[async_trait]
        impl EventLogStore for Unreachable {
            async fn create_event_logs(&self, _: i64, _: &[Log]) -> Result<(), StoreError> {
                unreachable!("not exercised by config tests")
            }
        }
    }

    const TOPIC: B256 =
        b256!("ee56c48c6a6e1a389a1a60cb3ac0ee74442f23c0ba32e1b4d57909d56a4f9ad6");

    fn extractor(checked_logs: Arc<RecordingCheckedLogs>) -> LogExtractor {
        LogExtractor::new(
            Arc::new(stubs::Unreachable),
            Arc::new(stubs::Unreachable),
            Arc::new(stubs::Unreachable),
            Arc::new(stubs::Unreachable),
            checked_logs,
            Arc::new(stubs::Unreachable),
        )
    }

    fn config(addresses: Vec<Address>, start: i64, end: i64) -> EventTransformerConfig {
        EventTransformerConfig { contract_addresses: addresses, topic0: TOPIC, starting_block: start, ending_block: end }
    }

    #[tokio::test]
    async fn aggregates_addresses_topics_and_block_bounds() {
        let addr_a = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let addr_b = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let mut extractor = extractor(Arc::new(RecordingCheckedLogs::default()));

        extractor
            .add_transformer_config(config(vec![addr_a], 100, EventTransformerConfig::UNBOUNDED))
            .await
            .unwrap();
        extractor.add_transformer_config(config(vec![addr_b], 50, 200)).await.unwrap();

        assert_eq!(extractor.addresses(), &[addr_a, addr_b]);
        assert_eq!(extractor.topics(), &[TOPIC]);
        assert_eq!(extractor.starting_block(), Some(50));
        assert_eq!(extractor.ending_block(), Some(EventTransformerConfig::UNBOUNDED));
    }

    #[tokio::test]
    async fn unbounded_ending_block_is_sticky() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let mut extractor = extractor(Arc::new(RecordingCheckedLogs::default()));

        extractor.add_transformer_config(config(vec![addr], 1, 500)).await.unwrap();
        extractor
            .add_transformer_config(config(vec![addr], 1, EventTransformerConfig::UNBOUNDED))
            .await
            .unwrap();
        extractor.add_transformer_config(config(vec![addr], 1, 900)).await.unwrap();

        assert_eq!(extractor.ending_block(), Some(EventTransformerConfig::UNBOUNDED));
    }

    #[tokio::test]
    async fn bounded_ending_block_takes_the_maximum() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let mut extractor = extractor(Arc::new(RecordingCheckedLogs::default()));

        extractor.add_transformer_config(config(vec![addr], 1, 500)).await.unwrap();
        extractor.add_transformer_config(config(vec![addr], 1, 200)).await.unwrap();

        assert_eq!(extractor.ending_block(), Some(500));
    }

    #[tokio::test]
    async fn records_new_subscriptions_once() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let checked_logs = Arc::new(RecordingCheckedLogs::default());
        let mut extractor = extractor(checked_logs.clone());

        extractor.add_transformer_config(config(vec![addr], 1, 10)).await.unwrap();

        let watched = checked_logs.watched.lock().unwrap();
        assert_eq!(watched.as_slice(), &[(vec![addr], TOPIC)]);
    }

    #[tokio::test]
    async fn skips_recording_known_subscriptions() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let checked_logs =
            Arc::new(RecordingCheckedLogs { already_watching: true, ..Default::default() });
        let mut extractor = extractor(checked_logs.clone());

        extractor.add_transformer_config(config(vec![addr], 1, 10)).await.unwrap();

        assert!(checked_logs.watched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn surfaces_subscription_lookup_failures() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let checked_logs =
            Arc::new(RecordingCheckedLogs { lookup_fails: true, ..Default::default() });
        let mut extractor = extractor(checked_logs);

        let err = extractor.add_transformer_config(config(vec![addr], 1, 10)).await.unwrap_err();
        assert!(matches!(err, ExtractError::CheckedLogLookup(_)));
    }

    #[tokio::test]
    async fn extraction_requires_a_registered_config() {
        let extractor = extractor(Arc::new(RecordingCheckedLogs::default()));
        let err = extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap_err();
        assert!(matches!(err, ExtractError::NoWatchedAddresses));
    }

    #[tokio::test]
    async fn extraction_signals_when_every_header_is_checked() {
        let addr = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let mut extractor = extractor(Arc::new(RecordingCheckedLogs::default()));
        extractor.add_transformer_config(config(vec![addr], 1, 10)).await.unwrap();

        // the stub checked-header store returns no headers
        let err = extractor.extract_logs(ExtractionMode::Unchecked).await.unwrap_err();
        assert!(err.is_no_unchecked_headers());
    }
}
