use alloy::primitives::{Address, Bytes, B256, U256};

/// A transaction row persisted alongside the logs that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: B256,
    /// Sender.
    pub tx_from: Address,
    /// Recipient; `None` for contract creation.
    pub tx_to: Option<Address>,
    /// Index of the transaction within its block.
    pub tx_index: i64,
    /// Sender nonce.
    pub nonce: i64,
    /// Transferred value in wei.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
}
