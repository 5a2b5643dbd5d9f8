use crate::{store_err, Db};
use async_trait::async_trait;
use dragnet_types::{StoreError, TransactionRecord, TransactionStore};

/// Transaction rows referenced by persisted event logs.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: Db,
}

impl TransactionRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn create_transactions(
        &self,
        header_id: i64,
        transactions: &[TransactionRecord],
    ) -> Result<(), StoreError> {
        let mut tx = self.db.pool().begin().await.map_err(store_err)?;
        for record in transactions {
            sqlx::query(
                "INSERT INTO transactions
                     (header_id, hash, tx_from, tx_to, tx_index, nonce, value, input_data)
                 VALUES ($1, $2, $3, $4, $5, $6, $7::numeric, $8)
                 ON CONFLICT (header_id, hash) DO NOTHING",
            )
            .bind(header_id)
            .bind(record.hash.to_string())
            .bind(record.tx_from.to_string())
            .bind(record.tx_to.map(|to| to.to_string()))
            .bind(record.tx_index)
            .bind(record.nonce)
            .bind(record.value.to_string())
            .bind(record.input.to_vec())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }
}
