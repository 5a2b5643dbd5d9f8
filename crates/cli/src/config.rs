use eyre::{eyre, Result};
use std::{env, path::PathBuf};

/// Default health-check file written by every worker on start.
const DEFAULT_HEALTH_CHECK: &str = "/tmp/execute_health_check";

/// Process environment for the subcommands.
#[derive(Debug, Clone)]
pub struct Env {
    /// Postgres connection string.
    pub database_url: String,
    /// HTTP JSON-RPC endpoint of the Ethereum node.
    pub eth_rpc_url: String,
    /// Path the worker heartbeats are written to.
    pub health_check_path: PathBuf,
}

impl Env {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        Ok(Self {
            database_url: database_url()?,
            eth_rpc_url: required("ETH_RPC_URL")?,
            health_check_path: env::var("DRAGNET_HEALTH_CHECK")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_HEALTH_CHECK)),
        })
    }
}

/// The Postgres connection string, the only configuration `migrate` needs.
pub fn database_url() -> Result<String> {
    required("DATABASE_URL")
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| eyre!("missing required environment variable {key}"))
}
