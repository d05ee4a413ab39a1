//! Runs against a live database: `DATABASE_URL=... cargo test --features postgres-tests`.
#![cfg(feature = "postgres-tests")]

use storybook_core::{Book, BookPatch, ListQuery, Page, SharedSettings, new_book_id};
use storybook_database::{
    PostgresBookRepository, PostgresSettingsRepository, database_url_from_env, establish_pool,
    run_pool_migrations,
};
use storybook_interface::{BookRepository, SettingsRepository};

fn pool() -> storybook_database::PgPool {
    let url = database_url_from_env().expect("DATABASE_URL must be set");
    let pool = establish_pool(&url, 2).expect("pool");
    run_pool_migrations(&pool).expect("migrations");
    pool
}

fn book(id: &str) -> Book {
    Book {
        id: id.to_string(),
        title: "Postgres Book".to_string(),
        theme: "databases".to_string(),
        target_age: "6-8".to_string(),
        moral_value: "patience".to_string(),
        cover_image_url: Some("https://img/cover.png".to_string()),
        pages: vec![Page::new(1, "one", "p1"), Page::new(2, "two", "p2")],
        created_at: None,
    }
}

#[tokio::test]
async fn book_lifecycle() {
    let repo = PostgresBookRepository::new(pool());
    let id = new_book_id();

    repo.create_book(&book(&id)).await.unwrap();
    let stored = repo.get_book(&id).await.unwrap();
    assert_eq!(stored.pages.len(), 2);
    assert!(stored.created_at.is_some());

    let listed = repo.list_books(&ListQuery::default()).await.unwrap();
    assert!(listed.iter().any(|s| s.id == id));

    let patch = BookPatch {
        title: Some("Renamed".to_string()),
        pages: Some(vec![Page::new(1, "only", "p1")]),
        ..Default::default()
    };
    let updated = repo.update_book(&id, &patch).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.theme, "databases");
    assert_eq!(updated.pages.len(), 1);

    repo.delete_book(&id).await.unwrap();
    repo.delete_book(&id).await.unwrap();
    assert!(repo.get_book(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn duplicate_pages_leave_no_rows() {
    let repo = PostgresBookRepository::new(pool());
    let id = new_book_id();
    let mut bad = book(&id);
    bad.pages.push(Page::new(2, "dup", "dup"));

    assert!(repo.create_book(&bad).await.is_err());
    assert!(repo.get_book(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn settings_upsert() {
    let repo = PostgresSettingsRepository::new(pool());
    let mut shared = SharedSettings::default();
    shared.brand_name = "Tales".to_string();
    repo.save_shared(&shared).await.unwrap();
    let loaded = repo.load_shared().await.unwrap().unwrap();
    assert_eq!(loaded.brand_name, "Tales");
}
