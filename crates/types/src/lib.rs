#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Domain types shared by the dragnet ingestion engine: block headers,
//! storage diffs, transformer configuration, the error taxonomy, and the
//! capability traits that the repositories and node client implement.

mod config;
pub use config::EventTransformerConfig;

mod diff;
pub use diff::{
    hashed_address, DiffError, DiffStatus, PersistedDiff, RawStorageDiff, UnknownStatus,
    EXPECTED_ROW_LENGTH,
};

mod error;
pub use error::{FetchError, StoreError, SyncError, TransformError, TransformErrorKind};

mod header;
pub use header::Header;

mod mode;
pub use mode::{ExtractionMode, WatchMode};

mod node;
pub use node::NodeFingerprint;

mod stores;
pub use stores::{
    CheckedHeaderStore, CheckedLogStore, EventLogStore, HeaderStore, LogFetcher, StorageDiffStore,
    TransactionStore, TransactionSyncer,
};

mod transaction;
pub use transaction::TransactionRecord;

mod transformer;
pub use transformer::{EventTransformer, StorageTransformer};
