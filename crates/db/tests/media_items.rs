//! Integration tests for `MediaItemRepo` lifecycle operations.

use sqlx::SqlitePool;
use snapsweep_core::item::LifecycleState;
use snapsweep_db::models::NewMediaItem;
use snapsweep_db::repositories::MediaItemRepo;

fn new_item(path: &str) -> NewMediaItem {
    NewMediaItem {
        file_path: path.to_string(),
        file_name: path.rsplit('/').next().unwrap().to_string(),
        file_size: 1024,
        created_at: 1_700_000_000_000,
        content_uri: None,
        thumbnail_path: None,
    }
}

// ---------------------------------------------------------------------------
// Insert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn insert_assigns_id(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap();
    assert!(id.is_some());

    let item = MediaItemRepo::find_by_id(&pool, id.unwrap())
        .await
        .unwrap()
        .expect("inserted row must exist");
    assert_eq!(item.file_path, "/m/a.png");
    assert!(!item.is_kept);
    assert_eq!(item.deletion_timestamp, None);
    assert_eq!(item.lifecycle_state(), LifecycleState::Unmarked);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_path_insert_is_a_noop(pool: SqlitePool) {
    let first = MediaItemRepo::insert(&pool, &new_item("/m/a.png")).await.unwrap();
    assert!(first.is_some());

    let second = MediaItemRepo::insert(&pool, &new_item("/m/a.png")).await.unwrap();
    assert_eq!(second, None);

    let all = MediaItemRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn rediscovery_does_not_revive_a_kept_item(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::keep(&pool, id).await.unwrap());

    // A second detection of the same path must not reset is_kept.
    MediaItemRepo::insert(&pool, &new_item("/m/a.png")).await.unwrap();

    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(item.is_kept);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_id_is_never_reused(pool: SqlitePool) {
    let first = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::delete_by_id(&pool, first).await.unwrap());

    let second = MediaItemRepo::insert(&pool, &new_item("/m/b.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(second > first);
}

// ---------------------------------------------------------------------------
// Lifecycle transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn schedule_then_keep_clears_deadline(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();

    assert!(MediaItemRepo::schedule_deletion(&pool, id, 2_000_000_000_000, Some("work-1"))
        .await
        .unwrap());
    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(item.lifecycle_state(), LifecycleState::Marked);
    assert_eq!(item.deletion_work_id.as_deref(), Some("work-1"));

    assert!(MediaItemRepo::keep(&pool, id).await.unwrap());
    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(item.is_kept);
    assert_eq!(item.deletion_timestamp, None);
    assert_eq!(item.deletion_work_id, None);
    assert_eq!(item.lifecycle_state(), LifecycleState::Kept);
}

#[sqlx::test(migrations = "./migrations")]
async fn kept_item_cannot_be_scheduled(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::keep(&pool, id).await.unwrap());

    let scheduled = MediaItemRepo::schedule_deletion(&pool, id, 2_000_000_000_000, None)
        .await
        .unwrap();
    assert!(!scheduled);

    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(item.deletion_timestamp, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn unkeep_returns_to_unmarked(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::keep(&pool, id).await.unwrap());
    assert!(MediaItemRepo::unkeep(&pool, id).await.unwrap());

    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(item.lifecycle_state(), LifecycleState::Unmarked);
}

#[sqlx::test(migrations = "./migrations")]
async fn unkeep_on_unkept_item_is_rejected(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(!MediaItemRepo::unkeep(&pool, id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn clear_schedule_unmarks(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::schedule_deletion(&pool, id, 2_000_000_000_000, None)
        .await
        .unwrap());
    assert!(MediaItemRepo::clear_schedule(&pool, id).await.unwrap());

    let item = MediaItemRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(item.lifecycle_state(), LifecycleState::Unmarked);
}

// ---------------------------------------------------------------------------
// Deadline queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn expired_query_excludes_kept_and_future_items(pool: SqlitePool) {
    let expired = MediaItemRepo::insert(&pool, &new_item("/m/expired.png"))
        .await
        .unwrap()
        .unwrap();
    let future = MediaItemRepo::insert(&pool, &new_item("/m/future.png"))
        .await
        .unwrap()
        .unwrap();
    let kept = MediaItemRepo::insert(&pool, &new_item("/m/kept.png"))
        .await
        .unwrap()
        .unwrap();

    let now = 1_800_000_000_000;
    MediaItemRepo::schedule_deletion(&pool, expired, now - 1, None).await.unwrap();
    MediaItemRepo::schedule_deletion(&pool, future, now + 60_000, None).await.unwrap();
    MediaItemRepo::schedule_deletion(&pool, kept, now - 1, None).await.unwrap();
    MediaItemRepo::keep(&pool, kept).await.unwrap();

    let rows = MediaItemRepo::query_expired(&pool, now).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, expired);

    let marked = MediaItemRepo::query_marked(&pool).await.unwrap();
    let marked_ids: Vec<_> = marked.iter().map(|m| m.id).collect();
    assert_eq!(marked_ids, vec![expired, future]);
}

// ---------------------------------------------------------------------------
// Compare-and-delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn second_delete_observes_missing_row(pool: SqlitePool) {
    let id = MediaItemRepo::insert(&pool, &new_item("/m/a.png"))
        .await
        .unwrap()
        .unwrap();
    assert!(MediaItemRepo::delete_by_id(&pool, id).await.unwrap());
    assert!(!MediaItemRepo::delete_by_id(&pool, id).await.unwrap());
}
