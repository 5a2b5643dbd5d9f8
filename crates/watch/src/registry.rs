use dragnet_db::Db;
use dragnet_types::{EventTransformer, StorageTransformer};
use std::sync::Arc;

/// Produces a storage transformer bound to the database handle.
///
/// Transformers are created by closures rather than passed in directly so
/// that user decoders can own their repositories without the core knowing
/// their concrete types.
pub type StorageTransformerInitializer =
    Box<dyn Fn(&Db) -> Arc<dyn StorageTransformer> + Send + Sync>;

/// Produces an event transformer bound to the database handle.
pub type EventTransformerInitializer =
    Box<dyn Fn(&Db) -> Box<dyn EventTransformer> + Send + Sync>;

/// The transformer sets that an integration layer exports to the watchers.
///
/// Loading these from a user plugin is an integration seam outside the
/// core; the watchers only consume the assembled lists.
#[derive(Default)]
pub struct TransformerExports {
    /// Event transformer initializers.
    pub events: Vec<EventTransformerInitializer>,
    /// Storage transformer initializers.
    pub storage: Vec<StorageTransformerInitializer>,
}

impl std::fmt::Debug for TransformerExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerExports")
            .field("events", &self.events.len())
            .field("storage", &self.storage.len())
            .finish()
    }
}
