use alloy::{
    consensus::Transaction as _,
    eips::BlockNumberOrTag,
    network::TransactionResponse,
    primitives::{Address, B256},
    providers::Provider,
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;
use dragnet_types::{FetchError, LogFetcher, NodeFingerprint, TransactionRecord};
use tracing::{instrument, warn};

/// Thin wrapper over an alloy provider exposing the three node calls the
/// engine needs: `eth_getLogs`, `eth_getTransactionByHash` and
/// `eth_blockNumber`.
#[derive(Debug, Clone)]
pub struct EthClient<P> {
    provider: P,
}

impl<P: Provider> EthClient<P> {
    /// Wrap a provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Current head block number.
    #[instrument(skip_all)]
    pub async fn head_block_number(&self) -> Result<i64, FetchError> {
        let number = self
            .provider
            .get_block_number()
            .await
            .map_err(FetchError::transport)
            .inspect_err(|err| warn!(%err, "failed to fetch head block number"))?;
        Ok(number as i64)
    }

    /// Fetch a transaction by hash and flatten it into the persisted shape.
    #[instrument(skip_all, fields(%hash))]
    pub async fn transaction_record(&self, hash: B256) -> Result<TransactionRecord, FetchError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(FetchError::transport)?
            .ok_or(FetchError::TransactionNotFound(hash))?;

        Ok(TransactionRecord {
            hash: tx.tx_hash(),
            tx_from: tx.from(),
            tx_to: tx.to(),
            tx_index: tx.transaction_index().map(|index| index as i64).unwrap_or_default(),
            nonce: tx.nonce() as i64,
            value: tx.value(),
            input: tx.input().clone(),
        })
    }

    /// Resolve the node's fingerprint: genesis hash, network id, and client
    /// banner. The p2p node id is best-effort (`admin_nodeInfo` is not
    /// served by every client).
    #[instrument(skip_all)]
    pub async fn node_fingerprint(&self) -> Result<NodeFingerprint, FetchError> {
        let genesis = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(0))
            .await
            .map_err(FetchError::transport)?
            .map(|block| block.header.hash.to_string())
            .unwrap_or_default();
        let network_id = self
            .provider
            .get_net_version()
            .await
            .map_err(FetchError::transport)?
            .to_string();
        let client_name = self
            .provider
            .get_client_version()
            .await
            .map_err(FetchError::transport)?;
        let node_id = self
            .provider
            .raw_request::<_, serde_json::Value>("admin_nodeInfo".into(), ())
            .await
            .ok()
            .and_then(|info| info.get("id").and_then(|id| id.as_str()).map(str::to_string))
            .unwrap_or_default();

        Ok(NodeFingerprint { genesis_block: genesis, network_id, node_id, client_name })
    }
}

#[async_trait]
impl<P: Provider> LogFetcher for EthClient<P> {
    #[instrument(skip_all, fields(%block_hash, addresses = addresses.len()))]
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        topics: &[B256],
        block_hash: B256,
    ) -> Result<Vec<Log>, FetchError> {
        let filter = Filter::new()
            .address(addresses.to_vec())
            .event_signature(topics.to_vec())
            .at_block_hash(block_hash);

        self.provider
            .get_logs(&filter)
            .await
            .map_err(FetchError::transport)
            .inspect_err(|err| warn!(%err, "eth_getLogs failed"))
    }
}
