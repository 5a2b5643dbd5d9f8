use dragnet_types::NodeFingerprint;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Embedded schema migrations, applied by `dragnet migrate`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors establishing the database handle.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Connecting to Postgres failed.
    #[error("failed to connect to postgres: {0}")]
    Connect(#[source] sqlx::Error),
    /// Applying migrations failed.
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    /// Upserting the node fingerprint failed.
    #[error("failed to register eth node: {0}")]
    RegisterNode(#[source] sqlx::Error),
}

/// Shared database handle: a connection pool plus the surrogate id of the
/// `eth_nodes` row all writes are stamped with.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    node_id: i32,
}

/// Open a connection pool without registering a node fingerprint. Used by
/// commands (migrations) that must run before any node is reachable.
pub async fn connect_pool(database_url: &str) -> Result<PgPool, DbError> {
    PgPoolOptions::new().max_connections(10).connect(database_url).await.map_err(DbError::Connect)
}

impl Db {
    /// Connect to Postgres and upsert the node fingerprint.
    pub async fn connect(database_url: &str, node: &NodeFingerprint) -> Result<Self, DbError> {
        let pool = connect_pool(database_url).await?;
        let node_id = register_node(&pool, node).await?;
        info!(node_id, client = %node.client_name, "connected to postgres");
        Ok(Self { pool, node_id })
    }

    /// Wrap an existing pool, upserting the node fingerprint.
    pub async fn from_pool(pool: PgPool, node: &NodeFingerprint) -> Result<Self, DbError> {
        let node_id = register_node(&pool, node).await?;
        Ok(Self { pool, node_id })
    }

    /// The underlying connection pool.
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Surrogate id of the `eth_nodes` row for this process.
    pub const fn node_id(&self) -> i32 {
        self.node_id
    }

    /// Apply any pending migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), DbError> {
        MIGRATOR.run(pool).await.map_err(Into::into)
    }
}

async fn register_node(pool: &PgPool, node: &NodeFingerprint) -> Result<i32, DbError> {
    // ON CONFLICT DO UPDATE so the id is returned for pre-existing rows too
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO eth_nodes (genesis_block, network_id, eth_node_id, client_name)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (genesis_block, network_id, eth_node_id, client_name)
         DO UPDATE SET client_name = EXCLUDED.client_name
         RETURNING id",
    )
    .bind(&node.genesis_block)
    .bind(&node.network_id)
    .bind(&node.node_id)
    .bind(&node.client_name)
    .fetch_one(pool)
    .await
    .map_err(DbError::RegisterNode)?;
    Ok(id)
}
