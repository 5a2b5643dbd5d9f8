use crate::{store_err, Db};
use alloy::primitives::B256;
use async_trait::async_trait;
use dragnet_types::{CheckedHeaderStore, Header, StoreError};
use sqlx::Row;
use std::str::FromStr;

/// Per-header `check_count` bookkeeping.
#[derive(Debug, Clone)]
pub struct CheckedHeaderRepository {
    db: Db,
}

impl CheckedHeaderRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckedHeaderStore for CheckedHeaderRepository {
    async fn unchecked_headers(
        &self,
        starting_block: i64,
        ending_block: i64,
        check_count_cap: i64,
    ) -> Result<Vec<Header>, StoreError> {
        let rows = sqlx::query(
            "SELECT headers.id, headers.block_number, headers.hash
             FROM headers
             LEFT JOIN checked_headers ON checked_headers.header_id = headers.id
             WHERE (checked_headers.header_id IS NULL
                    OR checked_headers.check_count < $1)
               AND headers.block_number >= $2
               AND ($3 = -1 OR headers.block_number <= $3)
               AND headers.eth_node_id = $4
             ORDER BY headers.block_number ASC",
        )
        .bind(check_count_cap)
        .bind(starting_block)
        .bind(ending_block)
        .bind(self.db.node_id())
        .fetch_all(self.db.pool())
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                let hash_text: String = row.try_get("hash").map_err(store_err)?;
                Ok(Header::new(
                    row.try_get("id").map_err(store_err)?,
                    row.try_get("block_number").map_err(store_err)?,
                    B256::from_str(&hash_text).map_err(StoreError::backend)?,
                ))
            })
            .collect()
    }

    async fn mark_header_checked(&self, header_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO checked_headers (header_id, check_count)
             VALUES ($1, 1)
             ON CONFLICT (header_id)
             DO UPDATE SET check_count = checked_headers.check_count + 1",
        )
        .bind(header_id)
        .execute(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn mark_single_header_unchecked(&self, block_number: i64) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE checked_headers
             SET check_count = 0
             FROM headers
             WHERE headers.id = checked_headers.header_id
               AND headers.block_number = $1",
        )
        .bind(block_number)
        .execute(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(())
    }
}
