//! Queue-semantics tests for the storage-diff repository against a live
//! Postgres. These are ignored by default; run them with
//! `DATABASE_URL=postgres://... cargo test -p dragnet-db -- --ignored`.

use alloy::primitives::B256;
use dragnet_db::{Db, StorageDiffRepository};
use dragnet_types::{NodeFingerprint, RawStorageDiff, StorageDiffStore};
use std::time::{SystemTime, UNIX_EPOCH};

async fn test_db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
    let pool = dragnet_db::connect_pool(&url).await.unwrap();
    Db::migrate(&pool).await.unwrap();
    let node = NodeFingerprint {
        genesis_block: "0x0000000000000000000000000000000000000000000000000000000000000000"
            .to_string(),
        network_id: "1".to_string(),
        node_id: "dragnet-db-tests".to_string(),
        client_name: "dragnet-db-tests".to_string(),
    };
    Db::from_pool(pool, &node).await.unwrap()
}

/// A slot key no previous test run has touched.
fn unique_slot() -> B256 {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut bytes = [0u8; 32];
    bytes[16..].copy_from_slice(&nanos.to_be_bytes());
    B256::from(bytes)
}

fn diff(slot: B256, block_height: i64, value: u8) -> RawStorageDiff {
    RawStorageDiff {
        hashed_address: B256::with_last_byte(0xaa),
        block_hash: B256::with_last_byte(0xbb),
        block_height,
        storage_key: slot,
        storage_value: B256::with_last_byte(value),
    }
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn duplicate_insert_returns_the_no_rows_sentinel() {
    let repo = StorageDiffRepository::new(test_db().await);
    let raw = diff(unique_slot(), 100, 5);

    let id = repo.create_diff(raw).await.unwrap();
    assert!(id > 0);

    let err = repo.create_diff(raw).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn back_filled_zero_value_without_prior_non_zero_diff_is_a_no_op() {
    let repo = StorageDiffRepository::new(test_db().await);
    let raw = diff(unique_slot(), 100, 0);

    repo.create_back_filled_value(raw).await.unwrap();

    // nothing was inserted, so a direct insert of the same tuple succeeds
    assert!(repo.create_diff(raw).await.is_ok());
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn back_filled_zero_value_after_a_non_zero_diff_is_inserted() {
    let repo = StorageDiffRepository::new(test_db().await);
    let slot = unique_slot();

    repo.create_diff(diff(slot, 100, 5)).await.unwrap();
    repo.create_back_filled_value(diff(slot, 200, 0)).await.unwrap();

    // the back-fill inserted the zero diff, so a direct insert conflicts
    let err = repo.create_diff(diff(slot, 200, 0)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn back_filling_an_already_known_value_is_a_no_op() {
    let repo = StorageDiffRepository::new(test_db().await);
    let slot = unique_slot();

    repo.create_diff(diff(slot, 100, 5)).await.unwrap();
    repo.create_back_filled_value(diff(slot, 200, 5)).await.unwrap();

    // the same value at a later block was suppressed
    assert!(repo.create_diff(diff(slot, 200, 5)).await.is_ok());
}
