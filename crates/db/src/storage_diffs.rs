use crate::{store_err, Db};
use alloy::primitives::B256;
use async_trait::async_trait;
use dragnet_types::{DiffStatus, PersistedDiff, RawStorageDiff, StorageDiffStore, StoreError};
use sqlx::Row;

/// The append-only `storage_diff` queue.
#[derive(Debug, Clone)]
pub struct StorageDiffRepository {
    db: Db,
}

impl StorageDiffRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }

    async fn mark_status(&self, id: i64, status: DiffStatus) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE storage_diff
             SET status = $1::diff_status, updated = NOW()
             WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(())
    }
}

fn bytes32(row: &sqlx::postgres::PgRow, column: &str) -> Result<B256, StoreError> {
    let bytes: Vec<u8> = row.try_get(column).map_err(store_err)?;
    B256::try_from(bytes.as_slice()).map_err(StoreError::backend)
}

fn row_to_diff(row: &sqlx::postgres::PgRow) -> Result<PersistedDiff, StoreError> {
    let status: String = row.try_get("status").map_err(store_err)?;
    Ok(PersistedDiff {
        id: row.try_get("id").map_err(store_err)?,
        header_id: row.try_get("header_id").map_err(store_err)?,
        status: status.parse().map_err(StoreError::backend)?,
        from_backfill: row.try_get("from_backfill").map_err(store_err)?,
        raw: RawStorageDiff {
            hashed_address: bytes32(row, "hashed_address")?,
            block_hash: bytes32(row, "block_hash")?,
            block_height: row.try_get("block_height").map_err(store_err)?,
            storage_key: bytes32(row, "storage_key")?,
            storage_value: bytes32(row, "storage_value")?,
        },
    })
}

#[async_trait]
impl StorageDiffStore for StorageDiffRepository {
    async fn create_diff(&self, raw: RawStorageDiff) -> Result<i64, StoreError> {
        sqlx::query_scalar(
            "INSERT INTO storage_diff
                 (hashed_address, block_height, block_hash, storage_key,
                  storage_value, eth_node_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING
             RETURNING id",
        )
        .bind(raw.hashed_address.to_vec())
        .bind(raw.block_height)
        .bind(raw.block_hash.to_vec())
        .bind(raw.storage_key.to_vec())
        .bind(raw.storage_value.to_vec())
        .bind(self.db.node_id())
        .fetch_optional(self.db.pool())
        .await
        .map_err(store_err)?
        .ok_or(StoreError::NotFound)
    }

    async fn create_back_filled_value(&self, raw: RawStorageDiff) -> Result<(), StoreError> {
        sqlx::query("SELECT create_back_filled_diff($1, $2, $3, $4, $5, $6)")
            .bind(raw.block_height)
            .bind(raw.block_hash.to_vec())
            .bind(raw.hashed_address.to_vec())
            .bind(raw.storage_key.to_vec())
            .bind(raw.storage_value.to_vec())
            .bind(self.db.node_id())
            .execute(self.db.pool())
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_diffs(
        &self,
        status: DiffStatus,
        min_id: i64,
        limit: i64,
    ) -> Result<Vec<PersistedDiff>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, block_height, block_hash, hashed_address, storage_key,
                    storage_value, status::text AS status, header_id, from_backfill
             FROM storage_diff
             WHERE status = $1::diff_status AND id > $2
             ORDER BY id ASC
             LIMIT $3",
        )
        .bind(status.as_str())
        .bind(min_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .map_err(store_err)?;
        rows.iter().map(row_to_diff).collect()
    }

    async fn first_diff_id_for_block_height(&self, height: i64) -> Result<i64, StoreError> {
        sqlx::query_scalar(
            "SELECT id FROM storage_diff
             WHERE block_height >= $1
             ORDER BY id ASC
             LIMIT 1",
        )
        .bind(height)
        .fetch_optional(self.db.pool())
        .await
        .map_err(store_err)?
        .ok_or(StoreError::NotFound)
    }

    async fn mark_transformed(&self, id: i64, header_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE storage_diff
             SET status = 'transformed'::diff_status, header_id = $1, updated = NOW()
             WHERE id = $2",
        )
        .bind(header_id)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn mark_noncanonical(&self, id: i64) -> Result<(), StoreError> {
        self.mark_status(id, DiffStatus::Noncanonical).await
    }

    async fn mark_unrecognized(&self, id: i64) -> Result<(), StoreError> {
        self.mark_status(id, DiffStatus::Unrecognized).await
    }

    async fn mark_unwatched(&self, id: i64) -> Result<(), StoreError> {
        self.mark_status(id, DiffStatus::Unwatched).await
    }
}
