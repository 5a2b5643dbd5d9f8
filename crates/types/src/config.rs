use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Configuration registered by an event transformer: which contracts and
/// event signature it decodes, and over which block range.
///
/// An `ending_block` of `-1` means the subscription is unbounded and tracks
/// the head of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTransformerConfig {
    /// Contract addresses whose logs the transformer decodes.
    pub contract_addresses: Vec<Address>,
    /// The event signature hash (topic0) the transformer decodes.
    pub topic0: B256,
    /// First block the transformer cares about.
    pub starting_block: i64,
    /// Last block the transformer cares about; `-1` for unbounded.
    pub ending_block: i64,
}

impl EventTransformerConfig {
    /// Sentinel ending block meaning "track the head of the chain".
    pub const UNBOUNDED: i64 = -1;

    /// Create a config for a single contract address.
    pub fn single(
        address: Address,
        topic0: B256,
        starting_block: i64,
        ending_block: i64,
    ) -> Self {
        Self { contract_addresses: vec![address], topic0, starting_block, ending_block }
    }

    /// True if this subscription tracks the head of the chain.
    pub const fn is_unbounded(&self) -> bool {
        self.ending_block == Self::UNBOUNDED
    }
}
