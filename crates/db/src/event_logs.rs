use crate::{store_err, Db};
use alloy::rpc::types::Log;
use async_trait::async_trait;
use dragnet_types::{EventLogStore, StoreError};
use tracing::debug;

/// Raw `event_logs` rows, content-addressed by
/// `(block_hash, tx_index, log_index)`.
#[derive(Debug, Clone)]
pub struct EventLogRepository {
    db: Db,
}

impl EventLogRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }
}

fn missing(field: &str) -> StoreError {
    StoreError::backend(format!("fetched log missing {field}"))
}

#[async_trait]
impl EventLogStore for EventLogRepository {
    async fn create_event_logs(&self, header_id: i64, logs: &[Log]) -> Result<(), StoreError> {
        let mut tx = self.db.pool().begin().await.map_err(store_err)?;
        for log in logs {
            let block_hash = log.block_hash.ok_or_else(|| missing("block hash"))?;
            let tx_index = log.transaction_index.ok_or_else(|| missing("tx index"))?;
            let log_index = log.log_index.ok_or_else(|| missing("log index"))?;
            let topics: Vec<Vec<u8>> =
                log.inner.data.topics().iter().map(|t| t.to_vec()).collect();

            sqlx::query(
                "INSERT INTO event_logs
                     (header_id, address, topics, data, block_number, block_hash,
                      tx_hash, tx_index, log_index, raw)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 ON CONFLICT (block_hash, tx_index, log_index) DO NOTHING",
            )
            .bind(header_id)
            .bind(log.inner.address.to_vec())
            .bind(topics)
            .bind(log.inner.data.data.to_vec())
            .bind(log.block_number.map(|n| n as i64))
            .bind(block_hash.to_string())
            .bind(log.transaction_hash.map(|h| h.to_string()))
            .bind(tx_index as i64)
            .bind(log_index as i64)
            .bind(serde_json::to_value(log).map_err(StoreError::backend)?)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        debug!(header_id, count = logs.len(), "persisted event logs");
        Ok(())
    }
}
