//! Check-count bookkeeping tests against a live Postgres. Ignored by
//! default; run with
//! `DATABASE_URL=postgres://... cargo test -p dragnet-db -- --ignored`.

use alloy::primitives::B256;
use dragnet_db::{CheckedHeaderRepository, Db, HeaderRepository};
use dragnet_types::{CheckedHeaderStore, NodeFingerprint};
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

/// A block number no previous test run has touched.
fn unique_block() -> i64 {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    (nanos % 1_000_000_000_000) as i64
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn checked_headers_drop_out_of_selection_until_reset() {
    let db = test_db().await;
    let headers = HeaderRepository::new(db.clone());
    let checked = CheckedHeaderRepository::new(db);

    let block = unique_block();
    let id =
        headers.create_or_update_header(block, B256::with_last_byte(9), None).await.unwrap();

    // never-checked headers are selected at the lowest cap
    let selected = checked.unchecked_headers(block, block, 1).await.unwrap();
    assert!(selected.iter().any(|header| header.id == id));

    // one completed pass moves the header past the unchecked cap but keeps
    // it eligible for rechecking
    checked.mark_header_checked(id).await.unwrap();
    let selected = checked.unchecked_headers(block, block, 1).await.unwrap();
    assert!(!selected.iter().any(|header| header.id == id));
    let selected = checked.unchecked_headers(block, block, 30).await.unwrap();
    assert!(selected.iter().any(|header| header.id == id));

    // a reset makes the header unchecked again
    checked.mark_single_header_unchecked(block).await.unwrap();
    let selected = checked.unchecked_headers(block, block, 1).await.unwrap();
    assert!(selected.iter().any(|header| header.id == id));
}

#[tokio::test]
#[ignore = "requires a live postgres"]
async fn check_counts_accumulate_one_increment_per_pass() {
    let db = test_db().await;
    let headers = HeaderRepository::new(db.clone());
    let checked = CheckedHeaderRepository::new(db);

    let block = unique_block();
    let id =
        headers.create_or_update_header(block, B256::with_last_byte(7), None).await.unwrap();

    for _ in 0..30 {
        checked.mark_header_checked(id).await.unwrap();
    }

    // the recheck cap now excludes the header
    let selected = checked.unchecked_headers(block, block, 30).await.unwrap();
    assert!(!selected.iter().any(|header| header.id == id));
}
