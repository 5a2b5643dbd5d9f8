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

//! Contains the log extractor: the engine that finds block headers still
//! owing log inspection, fetches matching logs from the node, and persists
//! them with check-count bookkeeping and a back-fill path.

mod chunk;
pub use chunk::{chunk_ranges, BlockRange};

mod error;
pub use error::ExtractError;

mod extractor;
pub use extractor::{LogExtractor, HEADER_CHUNK_SIZE, RECHECK_HEADER_CAP};
