use alloy::primitives::{keccak256, Address, B256};
use std::str::FromStr;

/// Number of columns expected in a CSV-encoded storage diff row.
pub const EXPECTED_ROW_LENGTH: usize = 5;

/// Keccak-256 of a contract address; the key under which the node emits
/// storage diffs and by which storage transformers are indexed.
pub fn hashed_address(address: Address) -> B256 {
    keccak256(address)
}

/// A raw key/value change to contract storage, as produced by the node's
/// state-diff feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStorageDiff {
    /// Keccak-256 of the contract address the slot belongs to.
    pub hashed_address: B256,
    /// Hash of the block the change was observed in.
    pub block_hash: B256,
    /// Height of the block the change was observed in.
    pub block_height: i64,
    /// The storage slot key.
    pub storage_key: B256,
    /// The post-change slot value.
    pub storage_value: B256,
}

impl RawStorageDiff {
    /// Build a diff from a CSV row of the form
    /// `contract_address, block_hash, block_height, storage_key, storage_value`.
    pub fn from_csv_row(row: &[String]) -> Result<Self, DiffError> {
        if row.len() != EXPECTED_ROW_LENGTH {
            return Err(DiffError::MalformedRow(row.len()));
        }
        Ok(Self {
            hashed_address: hex_to_keccak256_hash(&row[0])?,
            block_hash: hash_from_hex(&row[1])?,
            block_height: i64::from_str(&row[2])?,
            storage_key: hash_from_hex(&row[3])?,
            storage_value: hash_from_hex(&row[4])?,
        })
    }

    /// Build a diff from a state-diff leaf: the account key is already the
    /// hashed address, the key and value are raw slot bytes.
    pub fn from_state_diff_leaf(
        account_key: &[u8],
        block_hash: B256,
        block_height: i64,
        storage_key: &[u8],
        storage_value: &[u8],
    ) -> Result<Self, DiffError> {
        Ok(Self {
            hashed_address: padded_hash(account_key)?,
            block_hash,
            block_height,
            storage_key: padded_hash(storage_key)?,
            storage_value: padded_hash(storage_value)?,
        })
    }
}

/// Keccak-256 of hex-encoded bytes, e.g. a contract address string.
pub(crate) fn hex_to_keccak256_hash(hex_str: &str) -> Result<B256, DiffError> {
    let bytes = hex::decode(hex_str)?;
    Ok(keccak256(bytes))
}

fn hash_from_hex(hex_str: &str) -> Result<B256, DiffError> {
    let bytes = hex::decode(hex_str)?;
    padded_hash(&bytes)
}

fn padded_hash(bytes: &[u8]) -> Result<B256, DiffError> {
    if bytes.len() > 32 {
        return Err(DiffError::Overflow(bytes.len()));
    }
    Ok(B256::left_padding_from(bytes))
}

/// Errors constructing a [`RawStorageDiff`] from external input.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The row did not have [`EXPECTED_ROW_LENGTH`] columns.
    #[error("storage diff row malformed: expected {EXPECTED_ROW_LENGTH} columns, got {0}")]
    MalformedRow(usize),
    /// A column was not valid hex.
    #[error("invalid hex in storage diff row: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The block height column was not an integer.
    #[error("invalid block height in storage diff row: {0}")]
    Height(#[from] std::num::ParseIntError),
    /// A value was longer than 32 bytes.
    #[error("storage diff value of {0} bytes exceeds 32 bytes")]
    Overflow(usize),
}

/// Lifecycle status of a persisted storage diff.
///
/// A diff enters the queue as [`New`] and reaches a terminal status at most
/// once; [`Unrecognized`] rows may be revisited by a watcher draining that
/// status.
///
/// [`New`]: DiffStatus::New
/// [`Unrecognized`]: DiffStatus::Unrecognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffStatus {
    /// Not yet dispatched.
    New,
    /// Successfully decoded and persisted by a transformer.
    Transformed,
    /// The diff's block hash lost to a competing header outside the reorg
    /// window.
    Noncanonical,
    /// A transformer was watching the address but had no metadata for the
    /// slot key.
    Unrecognized,
    /// No transformer was watching the address.
    Unwatched,
}

impl DiffStatus {
    /// The status as stored in the `storage_diff.status` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Transformed => "transformed",
            Self::Noncanonical => "noncanonical",
            Self::Unrecognized => "unrecognized",
            Self::Unwatched => "unwatched",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "transformed" => Ok(Self::Transformed),
            "noncanonical" => Ok(Self::Noncanonical),
            "unrecognized" => Ok(Self::Unrecognized),
            "unwatched" => Ok(Self::Unwatched),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A `storage_diff.status` value that is not part of the lifecycle.
#[derive(Debug, thiserror::Error)]
#[error("unknown storage diff status: {0}")]
pub struct UnknownStatus(pub String);

/// A [`RawStorageDiff`] that has been persisted to the queue.
///
/// `header_id` is populated only once the diff's block hash has been
/// confirmed against the canonical header for its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedDiff {
    /// Queue id; monotonically increasing.
    pub id: i64,
    /// The canonical header the diff has been attached to, if any.
    pub header_id: Option<i64>,
    /// Lifecycle status.
    pub status: DiffStatus,
    /// True when inserted by the back-fill path.
    pub from_backfill: bool,
    /// The underlying raw diff.
    pub raw: RawStorageDiff,
}

impl PersistedDiff {
    /// Wrap a raw diff with its queue id, in the `new` status.
    pub const fn new(id: i64, raw: RawStorageDiff) -> Self {
        Self { id, header_id: None, status: DiffStatus::New, from_backfill: false, raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn csv_row_round_trips() {
        let row = vec![
            "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            "0xfa40fbe2d98d98b3363a778d52d2e22b1a9a2841f476b94753c8d6a8b63127f2".to_string(),
            "1000".to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000001".to_string(),
            "0x9dee".to_string(),
        ];

        let diff = RawStorageDiff::from_csv_row(&row).unwrap();

        let expected_address = address!("1234567890abcdef1234567890abcdef12345678");
        assert_eq!(diff.hashed_address, hashed_address(expected_address));
        assert_eq!(diff.block_height, 1000);
        assert_eq!(diff.storage_key, B256::with_last_byte(1));
        // short values are left-padded to 32 bytes
        assert_eq!(&diff.storage_value.as_slice()[30..], &[0x9d, 0xee]);
    }

    #[test]
    fn csv_row_rejects_wrong_column_count() {
        let row = vec!["0xabc".to_string(); 4];
        assert!(matches!(RawStorageDiff::from_csv_row(&row), Err(DiffError::MalformedRow(4))));
    }

    #[test]
    fn state_diff_leaf_rejects_oversized_values() {
        let err = RawStorageDiff::from_state_diff_leaf(&[0u8; 33], B256::ZERO, 1, &[], &[]);
        assert!(matches!(err, Err(DiffError::Overflow(33))));
    }

    #[test]
    fn status_round_trips_through_column_text() {
        for status in [
            DiffStatus::New,
            DiffStatus::Transformed,
            DiffStatus::Noncanonical,
            DiffStatus::Unrecognized,
            DiffStatus::Unwatched,
        ] {
            assert_eq!(status.as_str().parse::<DiffStatus>().unwrap(), status);
        }
        assert!("checked".parse::<DiffStatus>().is_err());
    }
}
