use crate::EthClient;
use alloy::{primitives::B256, providers::Provider, rpc::types::Log};
use async_trait::async_trait;
use dragnet_types::{SyncError, TransactionStore, TransactionSyncer};
use std::sync::Arc;
use tracing::debug;

/// Fetches the transactions referenced by freshly persisted logs and stores
/// them under the logs' header.
#[derive(Clone)]
pub struct RpcTransactionSyncer<P> {
    client: EthClient<P>,
    store: Arc<dyn TransactionStore>,
}

impl<P: Provider> RpcTransactionSyncer<P> {
    /// Create a syncer over a node client and a transaction store.
    pub fn new(client: EthClient<P>, store: Arc<dyn TransactionStore>) -> Self {
        Self { client, store }
    }
}

impl<P> std::fmt::Debug for RpcTransactionSyncer<P>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransactionSyncer").field("client", &self.client).finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: Provider + Clone> TransactionSyncer for RpcTransactionSyncer<P> {
    async fn sync_transactions(&self, header_id: i64, logs: &[Log]) -> Result<(), SyncError> {
        let mut hashes: Vec<B256> = logs.iter().filter_map(|log| log.transaction_hash).collect();
        hashes.sort_unstable();
        hashes.dedup();
        if hashes.is_empty() {
            return Ok(());
        }

        let mut records = Vec::with_capacity(hashes.len());
        for hash in hashes {
            records.push(self.client.transaction_record(hash).await?);
        }
        debug!(header_id, count = records.len(), "syncing transactions for header");
        self.store.create_transactions(header_id, &records).await?;
        Ok(())
    }
}
