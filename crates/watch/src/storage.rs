use crate::{RegistryError, StatusWriter, StorageTransformerInitializer, WatchError};
use alloy::primitives::B256;
use dragnet_db::{Db, HeaderRepository, StorageDiffRepository};
use dragnet_types::{
    HeaderStore, PersistedDiff, StorageDiffStore, StorageTransformer, StoreError,
    TransformErrorKind, WatchMode,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug, instrument, trace, warn};

/// Maximum diffs fetched from the queue per round.
pub const RESULTS_LIMIT: i64 = 500;

/// Number of blocks behind head within which a block-hash mismatch is
/// treated as a reorg still settling rather than a noncanonical diff.
pub const REORG_WINDOW: i64 = 250;

/// Continuously transforms queued storage diffs, skipping or deferring
/// those that cannot yet be resolved against a canonical header.
///
/// One watcher drains one status class ([`WatchMode`]); a deployment
/// typically runs a `New`-mode watcher and optionally an
/// `Unrecognized`-mode watcher beside it.
pub struct StorageWatcher {
    headers: Arc<dyn HeaderStore>,
    diffs: Arc<dyn StorageDiffStore>,
    transformers: HashMap<B256, Arc<dyn StorageTransformer>>,
    mode: WatchMode,
    diff_blocks_from_head: i64,
    results_limit: i64,
    reorg_window: i64,
    retry_interval: Duration,
    status_writer: StatusWriter,
}

impl std::fmt::Debug for StorageWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageWatcher")
            .field("mode", &self.mode)
            .field("transformers", &self.transformers.keys().collect::<Vec<_>>())
            .field("diff_blocks_from_head", &self.diff_blocks_from_head)
            .field("results_limit", &self.results_limit)
            .field("reorg_window", &self.reorg_window)
            .finish_non_exhaustive()
    }
}

impl StorageWatcher {
    /// Create a watcher over the shared database handle.
    ///
    /// `diff_blocks_from_head` of `-1` disables the head-relative window and
    /// every pending diff is considered.
    pub fn new(
        db: &Db,
        diff_blocks_from_head: i64,
        status_writer: StatusWriter,
        mode: WatchMode,
        retry_interval: Duration,
    ) -> Self {
        Self::with_stores(
            Arc::new(HeaderRepository::new(db.clone())),
            Arc::new(StorageDiffRepository::new(db.clone())),
            diff_blocks_from_head,
            status_writer,
            mode,
            retry_interval,
        )
    }

    /// Create a watcher over explicit stores. Exposed for tests and
    /// alternative backends.
    pub fn with_stores(
        headers: Arc<dyn HeaderStore>,
        diffs: Arc<dyn StorageDiffStore>,
        diff_blocks_from_head: i64,
        status_writer: StatusWriter,
        mode: WatchMode,
        retry_interval: Duration,
    ) -> Self {
        Self {
            headers,
            diffs,
            transformers: HashMap::new(),
            mode,
            diff_blocks_from_head,
            results_limit: RESULTS_LIMIT,
            reorg_window: REORG_WINDOW,
            retry_interval,
            status_writer,
        }
    }

    /// Override the per-round fetch limit.
    pub const fn with_results_limit(mut self, results_limit: i64) -> Self {
        self.results_limit = results_limit;
        self
    }

    /// Override the reorg window.
    pub const fn with_reorg_window(mut self, reorg_window: i64) -> Self {
        self.reorg_window = reorg_window;
        self
    }

    /// Materialise each initializer and index the transformer by its watched
    /// hashed address. Two transformers claiming the same address is a
    /// configuration error.
    pub fn add_transformers(
        &mut self,
        initializers: &[StorageTransformerInitializer],
        db: &Db,
    ) -> Result<(), RegistryError> {
        for initializer in initializers {
            self.register(initializer(db))?;
        }
        Ok(())
    }

    /// Register a single transformer.
    pub fn register(
        &mut self,
        transformer: Arc<dyn StorageTransformer>,
    ) -> Result<(), RegistryError> {
        let hashed_address = transformer.hashed_address();
        if self.transformers.insert(hashed_address, transformer).is_some() {
            return Err(RegistryError::DuplicateAddress(hashed_address));
        }
        Ok(())
    }

    /// Drain the queue forever.
    ///
    /// Each round fetches up to `results_limit` diffs in the watcher's
    /// status class above a head-relative minimum id, dispatches each, and
    /// sleeps only when a round comes back short.
    #[instrument(skip(self), fields(mode = self.mode.as_str()))]
    pub async fn execute(&self) -> Result<(), WatchError> {
        self.status_writer.write()?;

        let mut min_id = self.fallback_min_id().await?;
        loop {
            let diffs =
                self.diffs.get_diffs(self.mode.status(), min_id, self.results_limit).await?;
            for diff in &diffs {
                self.transform_diff(diff).await?;
            }

            if (diffs.len() as i64) < self.results_limit {
                min_id = self.fallback_min_id().await?;
                tokio::time::sleep(self.retry_interval).await;
            } else if let Some(last) = diffs.last() {
                min_id = last.id;
            }
        }
    }

    /// The id floor for the next fetch round.
    ///
    /// With the head-relative window enabled this is one below the first
    /// diff at or above `head - diff_blocks_from_head`; missing heads or
    /// diffs fall back to zero.
    async fn fallback_min_id(&self) -> Result<i64, WatchError> {
        if self.diff_blocks_from_head < 0 {
            return Ok(0);
        }
        let head = match self.headers.most_recent_block_number().await {
            Ok(head) => head,
            Err(StoreError::NotFound) => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let cutoff = head - self.diff_blocks_from_head;
        match self.diffs.first_diff_id_for_block_height(cutoff).await {
            Ok(first_id) => Ok(first_id - 1),
            Err(StoreError::NotFound) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Dispatch one diff, writing its terminal status if it reaches one.
    ///
    /// Transient conditions (no canonical header yet, a hash mismatch still
    /// inside the reorg window, a retryable transformer failure) leave the
    /// diff in its current status for a later round.
    async fn transform_diff(&self, diff: &PersistedDiff) -> Result<(), WatchError> {
        let Some(transformer) = self.transformers.get(&diff.raw.hashed_address) else {
            debug!(diff_id = diff.id, hashed_address = %diff.raw.hashed_address, "diff unwatched");
            self.diffs.mark_unwatched(diff.id).await?;
            return Ok(());
        };

        let header = match self.headers.get_header(diff.raw.block_height).await {
            Ok(header) => header,
            Err(StoreError::NotFound) => {
                trace!(diff_id = diff.id, block_height = diff.raw.block_height, "header not yet synced");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if header.hash != diff.raw.block_hash {
            let head = self.headers.most_recent_block_number().await?;
            if head - diff.raw.block_height > self.reorg_window {
                debug!(diff_id = diff.id, block_height = diff.raw.block_height, "diff noncanonical");
                self.diffs.mark_noncanonical(diff.id).await?;
            } else {
                trace!(diff_id = diff.id, "hash mismatch within reorg window; deferring");
            }
            return Ok(());
        }

        let mut resolved = *diff;
        resolved.header_id = Some(header.id);
        match transformer.execute(&resolved).await {
            Ok(()) => self.diffs.mark_transformed(diff.id, header.id).await?,
            Err(err) => match err.kind() {
                TransformErrorKind::KeyNotFound => {
                    self.diffs.mark_unrecognized(diff.id).await?;
                }
                TransformErrorKind::Transient => {
                    warn!(diff_id = diff.id, %err, "transformer failed; diff left pending");
                }
                TransformErrorKind::Fatal => return Err(err.into()),
            },
        }
        Ok(())
    }
}
