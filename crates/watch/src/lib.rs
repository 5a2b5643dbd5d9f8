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

//! Long-running watcher loops: the storage watcher that drains the diff
//! queue, the event watcher that supervises the log extractor, and the
//! shared retry/heartbeat plumbing both are built from.

mod error;
pub use error::{RegistryError, WatchError};

mod event;
pub use event::EventWatcher;

mod registry;
pub use registry::{
    EventTransformerInitializer, StorageTransformerInitializer, TransformerExports,
};

mod status;
pub use status::StatusWriter;

mod storage;
pub use storage::{StorageWatcher, REORG_WINDOW, RESULTS_LIMIT};

mod supervisor;
pub use supervisor::{supervise, Outcome, RetryPolicy};
