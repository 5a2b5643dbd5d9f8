use alloy::{
    primitives::{Address, Bytes, LogData, B256},
    rpc::types::Log,
};
use dragnet_types::{Header, PersistedDiff, RawStorageDiff};

/// A header row with a deterministic hash derived from its block number,
/// unless one is supplied.
pub fn fake_header(id: i64, block_number: i64, hash: Option<B256>) -> Header {
    let hash = hash.unwrap_or_else(|| B256::with_last_byte((block_number % 251) as u8));
    Header::new(id, block_number, hash)
}

/// A minimal RPC log carrying everything the event-log store requires.
pub fn fake_log(address: Address, topic0: B256, block_hash: B256, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address,
            data: LogData::new_unchecked(vec![topic0], Bytes::new()),
        },
        block_hash: Some(block_hash),
        block_number: Some(1),
        block_timestamp: None,
        transaction_hash: Some(B256::with_last_byte(0xbe)),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

/// A pending diff for the given slot owner at the given block.
pub fn fake_diff(id: i64, hashed_address: B256, block_height: i64, block_hash: B256) -> PersistedDiff {
    PersistedDiff::new(
        id,
        RawStorageDiff {
            hashed_address,
            block_hash,
            block_height,
            storage_key: B256::with_last_byte(1),
            storage_value: B256::with_last_byte(2),
        },
    )
}
