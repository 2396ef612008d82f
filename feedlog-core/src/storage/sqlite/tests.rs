use std::env::temp_dir;

use chrono::{Duration, TimeZone};
use uuid::Uuid;

use super::*;
use crate::window::DayWindow;

/// Create a temporary database for testing.
async fn create_test_store() -> SqliteStore {
    let db_path = temp_dir().join(format!("feedlog_test_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}", db_path.display());
    SqliteStore::new(&url)
        .await
        .expect("failed to create test store")
}

fn amount(n: i64) -> Amount {
    Amount::new(n).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn test_timestamp_encoding_is_fixed_width() {
    let a = SqliteStore::encode_timestamp(utc(2025, 1, 2, 3, 4));
    let b = SqliteStore::encode_timestamp(utc(2025, 1, 2, 3, 4) + Duration::milliseconds(5));
    assert_eq!(a, "2025-01-02T03:04:00.000Z");
    assert_eq!(b, "2025-01-02T03:04:00.005Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
}

#[test]
fn test_timestamp_roundtrip() {
    let t = utc(2025, 7, 8, 9, 10) + Duration::milliseconds(123);
    let decoded = SqliteStore::decode_timestamp(&SqliteStore::encode_timestamp(t)).unwrap();
    assert_eq!(decoded, t);
    assert!(matches!(
        SqliteStore::decode_timestamp("yesterday"),
        Err(StorageError::InvalidData(_))
    ));
}

#[tokio::test]
async fn test_empty_store_sums_are_zero() {
    let store = create_test_store().await;
    assert_eq!(store.sum_all().await.expect("sum_all failed"), 0);
    assert_eq!(
        store
            .sum_since(utc(2000, 1, 1, 0, 0))
            .await
            .expect("sum_since failed"),
        0
    );
    assert!(
        store
            .list_since(utc(2000, 1, 1, 0, 0))
            .await
            .expect("list_since failed")
            .is_empty()
    );
}

#[tokio::test]
async fn test_insert_assigns_increasing_ids() {
    let store = create_test_store().await;
    let first = store.insert(1, amount(5)).await.expect("insert failed");
    let second = store.insert(1, amount(3)).await.expect("insert failed");
    assert!(first > 0);
    assert!(second > first);
}

#[tokio::test]
async fn test_insert_increases_total_by_amount() {
    let store = create_test_store().await;
    let mut expected = 0;
    for n in [1, 20, 7, 13] {
        store.insert(42, amount(n)).await.expect("insert failed");
        expected += n;
        assert_eq!(store.sum_all().await.expect("sum failed"), expected);
    }
}

#[tokio::test]
async fn test_insert_stamps_current_time() {
    let store = create_test_store().await;
    let before = Utc::now() - Duration::seconds(1);
    store.insert(1, amount(2)).await.expect("insert failed");
    let records = store.list_since(before).await.expect("list failed");
    assert_eq!(records.len(), 1);
    assert!(records[0].created_at >= before);
    assert!(records[0].created_at <= Utc::now() + Duration::seconds(1));
}

#[tokio::test]
async fn test_amount_check_constraint() {
    let store = create_test_store().await;
    for bad in [0i64, 21, -1] {
        let result = sqlx::query("INSERT INTO feedings (owner_id, amount) VALUES (1, ?)")
            .bind(bad)
            .execute(&store.pool)
            .await;
        assert!(result.is_err(), "amount {} should be rejected", bad);
    }
    assert_eq!(store.sum_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_default_created_at_is_comparable() {
    let store = create_test_store().await;
    sqlx::query("INSERT INTO feedings (owner_id, amount) VALUES (9, 4)")
        .execute(&store.pool)
        .await
        .expect("raw insert failed");

    let records = store
        .list_since(Utc::now() - Duration::minutes(5))
        .await
        .expect("list failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].owner_id, 9);
    assert_eq!(records[0].amount.get(), 4);
}

#[tokio::test]
async fn test_delete_own_record() {
    let store = create_test_store().await;
    let id = store.insert(1, amount(5)).await.unwrap();

    let deleted = store
        .delete_by_id_and_owner(id, 1)
        .await
        .expect("delete failed");
    assert!(deleted);
    assert_eq!(store.sum_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_other_owners_record_is_noop() {
    let store = create_test_store().await;
    let id = store.insert(1, amount(5)).await.unwrap();

    let deleted = store
        .delete_by_id_and_owner(id, 2)
        .await
        .expect("delete should not error");
    assert!(!deleted);
    assert_eq!(store.sum_all().await.unwrap(), 5);
}

#[tokio::test]
async fn test_delete_missing_record_is_noop() {
    let store = create_test_store().await;
    let deleted = store
        .delete_by_id_and_owner(999, 1)
        .await
        .expect("delete should not error");
    assert!(!deleted);
}

#[tokio::test]
async fn test_sum_since_is_inclusive_lower_bound() {
    let store = create_test_store().await;
    let boundary = utc(2025, 3, 10, 0, 0);
    store
        .insert_at(1, amount(2), boundary - Duration::milliseconds(1))
        .await
        .unwrap();
    store.insert_at(1, amount(3), boundary).await.unwrap();
    store
        .insert_at(2, amount(4), boundary + Duration::hours(5))
        .await
        .unwrap();

    assert_eq!(store.sum_since(boundary).await.unwrap(), 7);
    assert_eq!(store.sum_all().await.unwrap(), 9);
}

#[tokio::test]
async fn test_list_since_orders_by_creation_time() {
    let store = create_test_store().await;
    let day = utc(2025, 3, 10, 0, 0);
    // Inserted out of chronological order on purpose.
    let late = store
        .insert_at(1, amount(1), day + Duration::hours(9))
        .await
        .unwrap();
    let early = store
        .insert_at(2, amount(2), day + Duration::hours(1))
        .await
        .unwrap();
    let middle = store
        .insert_at(1, amount(3), day + Duration::hours(4))
        .await
        .unwrap();
    store
        .insert_at(1, amount(4), day - Duration::hours(1))
        .await
        .unwrap();

    let records = store.list_since(day).await.unwrap();
    let ids: Vec<RecordId> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early, middle, late]);
    assert_eq!(records[0].owner_id, 2);
    assert_eq!(records[0].created_at, day + Duration::hours(1));
}

#[tokio::test]
async fn test_time_zone_changes_today_membership() {
    let store = create_test_store().await;
    // 23:30 UTC on March 10th is 08:30 on March 11th in Tokyo.
    let created = utc(2025, 3, 10, 23, 30);
    store.insert_at(1, amount(6), created).await.unwrap();

    let now = utc(2025, 3, 10, 23, 45);
    let utc_start = DayWindow::from_name(Some("UTC")).unwrap().start_of_day(now);
    let tokyo_start = DayWindow::from_name(Some("Asia/Tokyo"))
        .unwrap()
        .start_of_day(now);
    assert_eq!(store.sum_since(utc_start).await.unwrap(), 6);
    assert_eq!(store.sum_since(tokyo_start).await.unwrap(), 6);

    // Queried the next UTC morning: still "today" in Tokyo, "yesterday" in UTC.
    let now = utc(2025, 3, 11, 1, 0);
    let utc_start = DayWindow::default().start_of_day(now);
    let tokyo_start = DayWindow::from_name(Some("Asia/Tokyo"))
        .unwrap()
        .start_of_day(now);
    assert_eq!(store.sum_since(utc_start).await.unwrap(), 0);
    assert_eq!(store.sum_since(tokyo_start).await.unwrap(), 6);
}

#[tokio::test]
async fn test_create_storage_returns_trait_object() {
    let db_path = temp_dir().join(format!("feedlog_test_{}.db", Uuid::new_v4()));
    let store = create_storage(&db_path.display().to_string())
        .await
        .expect("create_storage failed");
    let id = store.insert(5, amount(10)).await.unwrap();
    assert!(id > 0);
    assert_eq!(store.sum_all().await.unwrap(), 10);
}

#[tokio::test]
async fn test_in_memory_store_keeps_records_across_queries() {
    let store = create_storage("sqlite::memory:")
        .await
        .expect("in-memory store failed");
    for n in 1..=6 {
        assert_eq!(store.insert(9, amount(n)).await.unwrap(), n);
    }
    assert_eq!(store.sum_all().await.unwrap(), 21);
    assert_eq!(
        store.list_since(utc(2000, 1, 1, 0, 0)).await.unwrap().len(),
        6
    );
}

#[tokio::test]
async fn test_store_creates_parent_directory() {
    let dir = temp_dir().join(format!("feedlog_dir_{}", Uuid::new_v4()));
    let url = format!("sqlite:{}", dir.join("nested/feedlog.db").display());
    let store = SqliteStore::new(&url).await.expect("store failed");
    assert_eq!(store.sum_all().await.unwrap(), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_reopen_keeps_records() {
    let db_path = temp_dir().join(format!("feedlog_test_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}", db_path.display());
    {
        let store = SqliteStore::new(&url).await.unwrap();
        store.insert(1, amount(8)).await.unwrap();
        store.pool.close().await;
    }
    let store = SqliteStore::new(&url).await.unwrap();
    assert_eq!(store.sum_all().await.unwrap(), 8);
}
