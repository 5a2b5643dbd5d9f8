use crate::{store_err, Db};
use alloy::primitives::B256;
use async_trait::async_trait;
use dragnet_types::{Header, HeaderStore, StoreError};
use sqlx::Row;
use std::str::FromStr;

/// Canonical `(block_number, block_hash, id)` store.
///
/// A reorg re-observes a block number under a new hash and inserts a new
/// row; the canonical header for a number is the most recently inserted one.
#[derive(Debug, Clone)]
pub struct HeaderRepository {
    db: Db,
}

impl HeaderRepository {
    /// Create a repository over the shared handle.
    pub const fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a header row, or return the existing id when the same
    /// `(block_number, hash)` has already been observed from this node.
    pub async fn create_or_update_header(
        &self,
        block_number: i64,
        hash: B256,
        raw: Option<serde_json::Value>,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO headers (block_number, hash, raw, eth_node_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (block_number, hash, eth_node_id)
             DO UPDATE SET raw = EXCLUDED.raw
             RETURNING id",
        )
        .bind(block_number)
        .bind(hash.to_string())
        .bind(raw)
        .bind(self.db.node_id())
        .fetch_one(self.db.pool())
        .await
        .map_err(store_err)?;
        Ok(id)
    }
}

fn row_to_header(row: &sqlx::postgres::PgRow) -> Result<Header, StoreError> {
    let hash_text: String = row.try_get("hash").map_err(store_err)?;
    let hash = B256::from_str(&hash_text).map_err(StoreError::backend)?;
    Ok(Header {
        id: row.try_get("id").map_err(store_err)?,
        block_number: row.try_get("block_number").map_err(store_err)?,
        hash,
        raw: row.try_get("raw").ok().flatten(),
    })
}

#[async_trait]
impl HeaderStore for HeaderRepository {
    async fn get_header(&self, block_number: i64) -> Result<Header, StoreError> {
        let row = sqlx::query(
            "SELECT id, block_number, hash, raw FROM headers
             WHERE block_number = $1 AND eth_node_id = $2
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(block_number)
        .bind(self.db.node_id())
        .fetch_optional(self.db.pool())
        .await
        .map_err(store_err)?
        .ok_or(StoreError::NotFound)?;
        row_to_header(&row)
    }

    async fn headers_in_range(&self, start: i64, end: i64) -> Result<Vec<Header>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (block_number) id, block_number, hash, raw FROM headers
             WHERE block_number >= $1 AND block_number <= $2 AND eth_node_id = $3
             ORDER BY block_number ASC, id DESC",
        )
        .bind(start)
        .bind(end)
        .bind(self.db.node_id())
        .fetch_all(self.db.pool())
        .await
        .map_err(store_err)?;
        rows.iter().map(row_to_header).collect()
    }

    async fn most_recent_block_number(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(block_number) FROM headers WHERE eth_node_id = $1",
        )
            .bind(self.db.node_id())
            .fetch_one(self.db.pool())
            .await
            .map_err(store_err)?
            .ok_or(StoreError::NotFound)
    }
}
