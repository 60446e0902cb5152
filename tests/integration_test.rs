//! Integration tests for daybook
//!
//! These tests verify end-to-end functionality including:
//! - Entry lifecycle across services
//! - Tagging, filtering and search
//! - Markdown export/import
//! - Backup and restore workflows

use daybook::app::AppState;
use daybook::config;
use daybook::database::{
    create_pool, CreateDiaryRequest, CreateTodoRequest, Mood, Repository, UpdateDiaryRequest,
};
use daybook::services::{BackupService, DiariesService, DiaryFilter, TransferService};
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test database with schema
async fn create_test_db() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(config::DATABASE_FILE_NAME);

    let pool = create_pool(&db_path).await.unwrap();
    let repo = Repository::new(pool);

    (repo, temp_dir)
}

#[tokio::test]
async fn test_entry_crud_operations() {
    let (repo, _temp) = create_test_db().await;
    let diaries = DiariesService::new(repo);

    // Create
    let entry = diaries
        .create_diary(CreateDiaryRequest {
            title: "First entry".to_string(),
            content: "It rained all day.".to_string(),
            mood: Some(Mood::Neutral),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(entry.diary.title, "First entry");
    assert!(!entry.diary.id.is_empty());

    // Read
    let retrieved = diaries.get_diary(&entry.diary.id).await.unwrap();
    assert_eq!(retrieved.diary.id, entry.diary.id);
    assert_eq!(retrieved.diary.mood, Some(Mood::Neutral));

    // Update
    let updated = diaries
        .update_diary(UpdateDiaryRequest {
            id: entry.diary.id.clone(),
            title: Some("Rainy Tuesday".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.diary.title, "Rainy Tuesday");
    assert_eq!(updated.diary.content, "It rained all day.");

    // List
    let entries = diaries.list_diaries().await.unwrap();
    assert_eq!(entries.len(), 1);

    // Delete is permanent
    diaries.delete_diary(&entry.diary.id).await.unwrap();

    assert!(diaries.get_diary(&entry.diary.id).await.is_err());
    assert_eq!(diaries.list_diaries().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_tagging_and_filtering_across_services() {
    let (repo, _temp) = create_test_db().await;
    let diaries = DiariesService::new(repo.clone());

    let hike = diaries
        .create_diary(CreateDiaryRequest {
            title: "Mountain hike".to_string(),
            content: "Steep but worth it.".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let office = diaries
        .create_diary(CreateDiaryRequest {
            title: "Office day".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let tag = diaries.tag_diary(&hike.diary.id, "outdoors").await.unwrap();
    diaries.tag_diary(&office.diary.id, "work").await.unwrap();

    // Filter by tag id
    let filter = DiaryFilter {
        tag_ids: vec![tag.id.clone()],
        ..Default::default()
    };
    let results = diaries.filtered(&filter).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].diary.title, "Mountain hike");

    // Query matches tag names too
    let filter = DiaryFilter {
        query: Some("outdoors".to_string()),
        ..Default::default()
    };
    let results = diaries.filtered(&filter).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].diary.title, "Mountain hike");

    // Deleting the entry cascades away the link but keeps the tag
    diaries.delete_diary(&hike.diary.id).await.unwrap();
    let remaining = repo.list_tags().await.unwrap();
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn test_search_ranks_title_hits_first() {
    let (repo, _temp) = create_test_db().await;
    let diaries = DiariesService::new(repo);

    diaries
        .create_diary(CreateDiaryRequest {
            title: "Tuesday".to_string(),
            content: "had coffee twice, then more coffee".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    diaries
        .create_diary(CreateDiaryRequest {
            title: "Coffee with Anna".to_string(),
            content: "we talked for hours".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let filter = DiaryFilter {
        query: Some("coffee".to_string()),
        ..Default::default()
    };
    let results = diaries.filtered(&filter).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].diary.title, "Coffee with Anna");
}

#[tokio::test]
async fn test_export_import_between_databases() {
    let (source_repo, _source_temp) = create_test_db().await;
    let source = TransferService::new(source_repo.clone());
    let source_diaries = DiariesService::new(source_repo);

    let entry = source_diaries
        .create_diary(CreateDiaryRequest {
            title: "Portable entry".to_string(),
            content: "travels as markdown".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    source_diaries
        .tag_diary(&entry.diary.id, "portable")
        .await
        .unwrap();

    let export_dir = TempDir::new().unwrap();
    let written = source.export_all(export_dir.path()).await.unwrap();
    assert_eq!(written.len(), 1);

    let (target_repo, _target_temp) = create_test_db().await;
    let target = TransferService::new(target_repo.clone());
    let report = target.import(export_dir.path()).await.unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 0);

    let target_diaries = DiariesService::new(target_repo);
    let entries = target_diaries.list_diaries().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].diary.title, "Portable entry");
    assert_eq!(entries[0].tags.len(), 1);
    assert_eq!(entries[0].tags[0].name, "portable");
}

#[tokio::test]
async fn test_backup_and_restore_workflow() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");

    let state = AppState::initialize(data_dir.clone()).await.unwrap();

    let entry = state
        .diaries
        .create_diary(CreateDiaryRequest {
            title: "Keep me safe".to_string(),
            content: "important words".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    state
        .todos
        .create_todo(CreateTodoRequest {
            title: "Water plants".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let backup = state.backup.create_backup().await.unwrap();
    assert!(Path::new(&backup.path).exists());

    // Restore into a fresh directory and verify everything came along
    let restore_dir = temp.path().join("restored");
    BackupService::restore_backup(Path::new(&backup.path), &restore_dir)
        .await
        .unwrap();

    let restored = AppState::initialize(restore_dir).await.unwrap();

    let recovered = restored.diaries.get_diary(&entry.diary.id).await.unwrap();
    assert_eq!(recovered.diary.title, "Keep me safe");

    let todos = restored.todos.list_todos().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Water plants");
}

#[tokio::test]
async fn test_app_state_wires_shared_events() {
    let temp = TempDir::new().unwrap();

    let state = AppState::initialize(temp.path().to_path_buf())
        .await
        .unwrap();

    // A watcher built from the diaries service must observe writes made
    // through the shared repository.
    let mut rx = state.diaries.watch().await.unwrap();
    assert!(rx.borrow().is_empty());

    state
        .repo
        .create_diary(CreateDiaryRequest {
            title: "Observed".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(1), rx.changed())
        .await
        .expect("watcher did not observe the insert")
        .unwrap();

    assert_eq!(rx.borrow_and_update().len(), 1);
}
