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

//! Client-side JSON-RPC plumbing: log fetching, transaction syncing, and
//! node identification over an alloy [`Provider`].
//!
//! [`Provider`]: alloy::providers::Provider

mod client;
pub use client::EthClient;

mod syncer;
pub use syncer::RpcTransactionSyncer;
