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

//! Postgres repositories backing the dragnet ingestion engine.
//!
//! Each repository implements one of the capability traits from
//! [`dragnet_types`]; the orchestrators only ever see those traits. The
//! queries use sqlx's runtime API so that compiling the workspace never
//! needs a live database.

mod db;
pub use db::{connect_pool, Db, DbError, MIGRATOR};

mod checked_headers;
pub use checked_headers::CheckedHeaderRepository;

mod checked_logs;
pub use checked_logs::CheckedLogRepository;

mod event_logs;
pub use event_logs::EventLogRepository;

mod headers;
pub use headers::HeaderRepository;

mod storage_diffs;
pub use storage_diffs::StorageDiffRepository;

mod transactions;
pub use transactions::TransactionRepository;

use dragnet_types::StoreError;

/// Map a sqlx error to the store error taxonomy: `RowNotFound` becomes the
/// "no rows" sentinel, everything else a backend failure.
fn store_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::backend(other),
    }
}
