use crate::{config::Env, exports::exports};
use alloy::providers::{Provider, ProviderBuilder};
use dragnet_db::{
    CheckedHeaderRepository, CheckedLogRepository, Db, EventLogRepository, HeaderRepository,
    TransactionRepository,
};
use dragnet_extract::LogExtractor;
use dragnet_rpc::{EthClient, RpcTransactionSyncer};
use dragnet_types::{CheckedHeaderStore, ExtractionMode, WatchMode};
use dragnet_watch::{EventWatcher, RetryPolicy, StatusWriter, StorageWatcher, WatchError};
use eyre::Result;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Run the event watcher plus a pair of storage watchers (one draining new
/// diffs, one revisiting unrecognized diffs) until one of them fails.
pub(crate) async fn execute(
    env: Env,
    recheck_headers: bool,
    retry_interval: Duration,
    max_unexpected_errs: u32,
    diff_blocks_from_head: i64,
) -> Result<()> {
    let exports = exports();
    let (client, db) = connect(&env).await?;
    let mode =
        if recheck_headers { ExtractionMode::Recheck } else { ExtractionMode::Unchecked };

    let mut workers: JoinSet<Result<(), WatchError>> = JoinSet::new();

    if !exports.events.is_empty() {
        let status_writer =
            StatusWriter::new(&env.health_check_path, "event watcher starting\n");
        let policy = RetryPolicy {
            retry_interval,
            max_consecutive_failures: max_unexpected_errs,
        };
        let mut watcher =
            EventWatcher::new(build_extractor(&client, &db), status_writer, policy);
        watcher.add_transformers(&exports.events, &db).await?;
        info!("executing event transformers");
        workers.spawn(async move { watcher.execute(mode).await });
    }

    if !exports.storage.is_empty() {
        for (watch_mode, banner) in [
            (WatchMode::New, "storage watcher for new diffs starting\n"),
            (WatchMode::Unrecognized, "storage watcher for unrecognized diffs starting\n"),
        ] {
            let status_writer = StatusWriter::new(&env.health_check_path, banner);
            let mut watcher = StorageWatcher::new(
                &db,
                diff_blocks_from_head,
                status_writer,
                watch_mode,
                retry_interval,
            );
            watcher.add_transformers(&exports.storage, &db)?;
            info!(mode = watch_mode.as_str(), "executing storage transformers");
            workers.spawn(async move { watcher.execute().await });
        }
    }

    if workers.is_empty() {
        warn!("no transformers configured; nothing to watch");
        return Ok(());
    }

    // watchers only return on fatal errors; surface the first one
    while let Some(joined) = workers.join_next().await {
        joined??;
    }
    Ok(())
}

/// Register every configured event transformer and back-fill its logs up to
/// the given block, without touching header check counts.
pub(crate) async fn backfill_events(env: Env, ending_block_number: i64) -> Result<()> {
    let exports = exports();
    if exports.events.is_empty() {
        warn!("not back-filling events because no transformers configured");
        return Ok(());
    }

    let (client, db) = connect(&env).await?;
    let mut extractor = build_extractor(&client, &db);
    for initializer in &exports.events {
        let transformer = initializer(&db);
        extractor.add_transformer_config(transformer.config().clone()).await?;
    }

    extractor.back_fill_logs(ending_block_number).await?;
    info!("completed back-filling events");
    Ok(())
}

/// Reset `check_count` to zero for the header at the given block so the
/// next extraction pass picks it up again.
pub(crate) async fn reset_header_check_count(env: Env, block_number: i64) -> Result<()> {
    let (_, db) = connect(&env).await?;
    CheckedHeaderRepository::new(db).mark_single_header_unchecked(block_number).await?;
    info!(block_number, "reset header check count");
    Ok(())
}

/// Apply any pending schema migrations.
pub(crate) async fn migrate(database_url: &str) -> Result<()> {
    let pool = dragnet_db::connect_pool(database_url).await?;
    Db::migrate(&pool).await?;
    info!("migrations applied");
    Ok(())
}

async fn connect(env: &Env) -> Result<(EthClient<impl Provider + Clone + 'static>, Db)> {
    let provider = ProviderBuilder::new().connect_http(env.eth_rpc_url.parse()?);
    let client = EthClient::new(provider);
    let fingerprint = client.node_fingerprint().await?;
    let db = Db::connect(&env.database_url, &fingerprint).await?;
    Ok((client, db))
}

fn build_extractor<P: Provider + Clone + 'static>(client: &EthClient<P>, db: &Db) -> LogExtractor {
    let transactions = Arc::new(TransactionRepository::new(db.clone()));
    LogExtractor::new(
        Arc::new(client.clone()),
        Arc::new(RpcTransactionSyncer::new(client.clone(), transactions)),
        Arc::new(HeaderRepository::new(db.clone())),
        Arc::new(CheckedHeaderRepository::new(db.clone())),
        Arc::new(CheckedLogRepository::new(db.clone())),
        Arc::new(EventLogRepository::new(db.clone())),
    )
}
