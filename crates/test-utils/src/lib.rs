#![warn(missing_debug_implementations, unreachable_pub, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Mock implementations of the dragnet capability traits, plus fixture
//! helpers for building logs, headers and diffs in tests.
//!
//! The mocks record the calls they receive and replay scripted responses;
//! once a script is exhausted they fail with a backend error, which gives
//! the otherwise-unbounded watcher loops a deterministic way to stop under
//! test.

mod fixtures;
pub use fixtures::{fake_diff, fake_header, fake_log};

mod mocks;
pub use mocks::{
    MockCheckedHeaderStore, MockCheckedLogStore, MockEventLogStore, MockHeaderStore,
    MockLogFetcher, MockStorageDiffStore, MockStorageTransformer, MockTransactionStore,
    MockTransactionSyncer, TransformBehavior,
};
