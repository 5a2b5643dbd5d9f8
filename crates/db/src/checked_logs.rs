use crate::{store_err, Db};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use dragnet_types::{CheckedLogStore, StoreError};

/// Remembers which `(addresses, topic0)` sets have ever been subscribed to.
///
/// Addresses are sorted before they touch the unique key so that the same
/// set in a different order matches the existing row.
#[derive(Debug, Clone)]
pub struct CheckedLogRepository {
    db: Db,
}

impl CheckedLogRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }
}

fn sorted_hex(addresses: &[Address]) -> Vec<String> {
    let mut sorted: Vec<String> = addresses.iter().map(ToString::to_string).collect();
    sorted.sort();
    sorted
}

#[async_trait]
impl CheckedLogStore for CheckedLogRepository {
    async fn already_watching(
        &self,
        addresses: &[Address],
        topic0: B256,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM checked_logs
             WHERE contract_addresses = $1 AND topic_zero = $2",
        )
        .bind(sorted_hex(addresses))
        .bind(topic0.to_string())
        .fetch_one(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn mark_watched(&self, addresses: &[Address], topic0: B256) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO checked_logs (contract_addresses, topic_zero)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(sorted_hex(addresses))
        .bind(topic0.to_string())
        .execute(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(())
    }
}
