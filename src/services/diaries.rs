//! Diaries service
//!
//! High-level business logic for diary entries. Validates input,
//! joins tags onto entries, runs the in-memory filter pipeline and
//! exposes a live view of the diary list for long-running frontends.

use crate::config;
use crate::database::{
    CreateDiaryRequest, DataEvent, DiaryWithTags, Repository, Tag, UpdateDiaryRequest,
};
use crate::error::{AppError, Result};
use crate::services::search::{self, DiaryFilter};
use tokio::sync::{broadcast, watch};

/// Service for managing diary entries
#[derive(Clone)]
pub struct DiariesService {
    repo: Repository,
}

impl DiariesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new diary entry
    pub async fn create_diary(&self, req: CreateDiaryRequest) -> Result<DiaryWithTags> {
        validate_title(&req.title)?;
        validate_content(&req.content)?;
        validate_images(&req.images)?;

        tracing::info!("Creating new diary entry: {}", req.title);

        let diary = self.repo.create_diary(req).await?;

        tracing::info!("Diary entry created successfully: {}", diary.id);

        Ok(DiaryWithTags {
            diary,
            tags: Vec::new(),
        })
    }

    /// Get a diary entry with its tags
    pub async fn get_diary(&self, id: &str) -> Result<DiaryWithTags> {
        let diary = self.repo.get_diary(id).await?;
        let tags = self.repo.tags_for_diary(&diary.id).await?;

        Ok(DiaryWithTags { diary, tags })
    }

    /// List all diary entries with their tags
    pub async fn list_diaries(&self) -> Result<Vec<DiaryWithTags>> {
        let diaries = self.repo.list_diaries().await?;

        let mut entries = Vec::with_capacity(diaries.len());
        for diary in diaries {
            let tags = self.repo.tags_for_diary(&diary.id).await?;
            entries.push(DiaryWithTags { diary, tags });
        }

        Ok(entries)
    }

    /// List entries matching a filter, searched and sorted in memory
    pub async fn filtered(&self, filter: &DiaryFilter) -> Result<Vec<DiaryWithTags>> {
        let entries = self.list_diaries().await?;
        Ok(search::apply(filter, entries))
    }

    /// Update a diary entry
    pub async fn update_diary(&self, req: UpdateDiaryRequest) -> Result<DiaryWithTags> {
        if let Some(title) = &req.title {
            validate_title(title)?;
        }
        if let Some(content) = &req.content {
            validate_content(content)?;
        }
        if let Some(images) = &req.images {
            validate_images(images)?;
        }

        tracing::debug!("Updating diary entry: {}", req.id);

        let diary = self.repo.update_diary(req).await?;
        let tags = self.repo.tags_for_diary(&diary.id).await?;

        tracing::debug!("Diary entry updated successfully: {}", diary.id);

        Ok(DiaryWithTags { diary, tags })
    }

    /// Mark or unmark an entry as favorite
    pub async fn set_favorite(&self, id: &str, favorite: bool) -> Result<()> {
        self.repo.set_diary_favorite(id, favorite).await
    }

    /// Pin or unpin an entry
    pub async fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        self.repo.set_diary_pinned(id, pinned).await
    }

    /// Delete a diary entry and its tag links
    pub async fn delete_diary(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting diary entry: {}", id);

        self.repo.delete_diary(id).await?;

        tracing::info!("Diary entry deleted successfully: {}", id);

        Ok(())
    }

    /// Attach a tag by name, creating the tag if it does not exist yet.
    /// Tag lookup is case-insensitive, so "Travel" and "travel" resolve
    /// to the same tag.
    pub async fn tag_diary(&self, diary_id: &str, tag_name: &str) -> Result<Tag> {
        let name = tag_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tag name cannot be empty".to_string()));
        }
        if name.chars().count() > config::MAX_TAG_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Tag name exceeds maximum length of {} characters",
                config::MAX_TAG_NAME_LENGTH
            )));
        }

        // Fail early with a proper not-found error rather than an FK violation
        self.repo.get_diary(diary_id).await?;

        let tag = self
            .repo
            .get_or_create_tag(name, config::DEFAULT_TAG_COLOR)
            .await?;
        self.repo.attach_tag(diary_id, &tag.id).await?;

        Ok(tag)
    }

    /// Detach a tag by name. Unknown tag names are an error, a tag that
    /// simply was not attached is not.
    pub async fn untag_diary(&self, diary_id: &str, tag_name: &str) -> Result<()> {
        let tag = self
            .repo
            .get_tag_by_name(tag_name.trim())
            .await?
            .ok_or_else(|| AppError::TagNotFound(tag_name.to_string()))?;

        self.repo.detach_tag(diary_id, &tag.id).await
    }

    /// Subscribe to a live view of the diary list.
    ///
    /// The returned receiver always holds the latest full list. A
    /// background task recomputes it whenever diaries, tags or
    /// categories change, and stops once the repository (or every
    /// receiver) is gone.
    pub async fn watch(&self) -> Result<watch::Receiver<Vec<DiaryWithTags>>> {
        let initial = self.list_diaries().await?;
        let (tx, rx) = watch::channel(initial);

        let service = self.clone();
        let mut events = self.repo.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(DataEvent::Diaries | DataEvent::Tags | DataEvent::Categories) => {}
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events collapse into one recompute
                        tracing::warn!("Diary watcher lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                match service.list_diaries().await {
                    Ok(entries) => {
                        if tx.send(entries).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to refresh diary list: {}", e);
                    }
                }
            }

            tracing::debug!("Diary watcher stopped");
        });

        Ok(rx)
    }

    /// Total number of entries
    pub async fn count(&self) -> Result<i64> {
        self.repo.count_diaries().await
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > config::MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title exceeds maximum length of {} characters",
            config::MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.len() > config::MAX_CONTENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Content exceeds maximum size of {} bytes",
            config::MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

fn validate_images(images: &[String]) -> Result<()> {
    if images.len() > config::MAX_IMAGES_PER_DIARY {
        return Err(AppError::Validation(format!(
            "At most {} images can be attached to an entry",
            config::MAX_IMAGES_PER_DIARY
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Repository};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> DiariesService {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        DiariesService::new(Repository::new(pool))
    }

    fn create_request(title: &str) -> CreateDiaryRequest {
        CreateDiaryRequest {
            title: title.to_string(),
            content: "some content".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_diary() {
        let service = create_test_service().await;

        let created = service.create_diary(create_request("Monday")).await.unwrap();
        let fetched = service.get_diary(&created.diary.id).await.unwrap();

        assert_eq!(fetched.diary.id, created.diary.id);
        assert_eq!(fetched.diary.title, "Monday");
        assert!(fetched.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = create_test_service().await;

        let result = service.create_diary(create_request("   ")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_title() {
        let service = create_test_service().await;

        let long_title = "x".repeat(config::MAX_TITLE_LENGTH + 1);
        let result = service.create_diary(create_request(&long_title)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_too_many_images() {
        let service = create_test_service().await;

        let mut req = create_request("Photos");
        req.images = (0..=config::MAX_IMAGES_PER_DIARY)
            .map(|i| format!("img_{}.jpg", i))
            .collect();

        let result = service.create_diary(req).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        let service = create_test_service().await;
        let created = service.create_diary(create_request("Monday")).await.unwrap();

        let result = service
            .update_diary(UpdateDiaryRequest {
                id: created.diary.id,
                title: Some("".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_tag_diary_creates_missing_tag() {
        let service = create_test_service().await;
        let created = service.create_diary(create_request("Trip")).await.unwrap();

        let tag = service.tag_diary(&created.diary.id, "travel").await.unwrap();

        assert_eq!(tag.name, "travel");
        assert_eq!(tag.color, config::DEFAULT_TAG_COLOR);

        let fetched = service.get_diary(&created.diary.id).await.unwrap();
        assert_eq!(fetched.tags.len(), 1);
        assert_eq!(fetched.tags[0].name, "travel");
    }

    #[tokio::test]
    async fn test_tag_diary_reuses_tag_case_insensitively() {
        let service = create_test_service().await;
        let first = service.create_diary(create_request("One")).await.unwrap();
        let second = service.create_diary(create_request("Two")).await.unwrap();

        let a = service.tag_diary(&first.diary.id, "Work").await.unwrap();
        let b = service.tag_diary(&second.diary.id, "work").await.unwrap();

        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_tag_diary_rejects_unknown_diary() {
        let service = create_test_service().await;

        let result = service.tag_diary("no-such-id", "travel").await;

        assert!(matches!(result, Err(AppError::DiaryNotFound(_))));
    }

    #[tokio::test]
    async fn test_untag_diary() {
        let service = create_test_service().await;
        let created = service.create_diary(create_request("Trip")).await.unwrap();

        service.tag_diary(&created.diary.id, "travel").await.unwrap();
        service.untag_diary(&created.diary.id, "travel").await.unwrap();

        let fetched = service.get_diary(&created.diary.id).await.unwrap();
        assert!(fetched.tags.is_empty());
    }

    #[tokio::test]
    async fn test_untag_unknown_tag_fails() {
        let service = create_test_service().await;
        let created = service.create_diary(create_request("Trip")).await.unwrap();

        let result = service.untag_diary(&created.diary.id, "missing").await;

        assert!(matches!(result, Err(AppError::TagNotFound(_))));
    }

    #[tokio::test]
    async fn test_filtered_by_query() {
        let service = create_test_service().await;

        let mut req = create_request("Garden work");
        req.content = "planted the garden beds".to_string();
        service.create_diary(req).await.unwrap();
        service.create_diary(create_request("Cinema")).await.unwrap();

        let filter = DiaryFilter {
            query: Some("garden".to_string()),
            ..Default::default()
        };

        let results = service.filtered(&filter).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].diary.title, "Garden work");
    }

    #[tokio::test]
    async fn test_watch_sees_new_entries() {
        let service = create_test_service().await;

        let mut rx = service.watch().await.unwrap();
        assert!(rx.borrow().is_empty());

        service.create_diary(create_request("First")).await.unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), rx.changed())
            .await
            .expect("watcher did not observe the insert")
            .unwrap();

        let entries = rx.borrow_and_update();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].diary.title, "First");
    }
}
