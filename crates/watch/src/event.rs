use crate::{
    supervise, EventTransformerInitializer, Outcome, RetryPolicy, StatusWriter, WatchError,
};
use dragnet_db::Db;
use dragnet_extract::LogExtractor;
use dragnet_types::ExtractionMode;
use tracing::{info, instrument};

/// Supervises the log extractor: polls it in a loop, sleeping on the
/// "nothing to do" sentinel and tolerating a bounded number of consecutive
/// unexpected failures before giving up.
#[derive(Debug)]
pub struct EventWatcher {
    extractor: LogExtractor,
    status_writer: StatusWriter,
    policy: RetryPolicy,
}

impl EventWatcher {
    /// Create a watcher around an extractor.
    pub const fn new(
        extractor: LogExtractor,
        status_writer: StatusWriter,
        policy: RetryPolicy,
    ) -> Self {
        Self { extractor, status_writer, policy }
    }

    /// Materialise each initializer and register its configuration with the
    /// extractor.
    pub async fn add_transformers(
        &mut self,
        initializers: &[EventTransformerInitializer],
        db: &Db,
    ) -> Result<(), WatchError> {
        for initializer in initializers {
            let transformer = initializer(db);
            self.extractor.add_transformer_config(transformer.config().clone()).await?;
        }
        Ok(())
    }

    /// Run extraction until the retry budget is exhausted or a fatal error
    /// occurs.
    #[instrument(skip(self))]
    pub async fn execute(&self, mode: ExtractionMode) -> Result<(), WatchError> {
        self.status_writer.write()?;
        info!(?mode, "event watcher starting");

        supervise(self.policy, || async {
            match self.extractor.extract_logs(mode).await {
                Ok(()) => Outcome::Continue,
                Err(err) if err.is_no_unchecked_headers() => Outcome::Sleep,
                Err(err) => Outcome::Retry(WatchError::Extract(err)),
            }
        })
        .await
    }

    /// The wrapped extractor, for registering configs directly.
    pub fn extractor_mut(&mut self) -> &mut LogExtractor {
        &mut self.extractor
    }
}
