/// Identity of the Ethereum node a row of data came from.
///
/// The fields mirror the `eth_nodes` unique key; the store assigns a
/// surrogate id that stamps headers and storage diffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFingerprint {
    /// Hash of the node's genesis block.
    pub genesis_block: String,
    /// Network id reported by `net_version`.
    pub network_id: String,
    /// Node identifier (public key or enode id), if known.
    pub node_id: String,
    /// Client banner reported by `web3_clientVersion`.
    pub client_name: String,
}
