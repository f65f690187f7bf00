use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn missing_item_reads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get_item("nope").await.expect("read"), None);
    assert!(!storage.remove_item("nope").await.expect("remove"));
}

#[tokio::test]
async fn set_item_overwrites_previous_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_item("theme", "light").await.expect("first write");
    storage.set_item("theme", "dark").await.expect("second write");

    let entry = storage
        .get_entry("theme")
        .await
        .expect("read")
        .expect("entry exists");
    assert_eq!(entry.key, "theme");
    assert_eq!(entry.value, "dark");
    assert!(entry.updated_at <= Utc::now());
}

#[tokio::test]
async fn session_token_lifecycle() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.session_token().await.expect("read"), None);

    storage
        .store_session_token("opaque-token")
        .await
        .expect("store");
    assert_eq!(
        storage.session_token().await.expect("read").as_deref(),
        Some("opaque-token")
    );

    storage.clear_session_token().await.expect("clear");
    assert_eq!(storage.session_token().await.expect("read"), None);

    // Clearing an already empty session is not an error.
    storage.clear_session_token().await.expect("clear again");
}

#[tokio::test]
async fn token_survives_reopening_file_database() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("nested").join("wallet.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("db");
        storage.store_session_token("persisted").await.expect("store");
        storage.pool().close().await;
    }

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.session_token().await.expect("read").as_deref(),
        Some("persisted")
    );
}

#[test]
fn sqlite_path_ignores_memory_and_foreign_urls() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("postgres://localhost/db"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/wallet.db?mode=rwc"),
        Some(PathBuf::from("./data/wallet.db"))
    );
}
