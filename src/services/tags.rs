//! Tags service
//!
//! Tag lifecycle on top of the repository. Enforces name validation
//! and the rename collision rule the schema itself does not: two tags
//! may not share a name, compared case-insensitively.

use crate::config;
use crate::database::{Diary, Repository, Tag};
use crate::error::{AppError, Result};

/// Service for managing tags
#[derive(Clone)]
pub struct TagsService {
    repo: Repository,
}

impl TagsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a tag with an explicit color
    pub async fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let name = validate_name(name)?;

        if self.repo.get_tag_by_name(name).await?.is_some() {
            return Err(AppError::Validation(format!(
                "A tag named '{}' already exists",
                name
            )));
        }

        self.repo.create_tag(name, color).await
    }

    /// Get a tag by ID
    pub async fn get_tag(&self, id: &str) -> Result<Tag> {
        self.repo.get_tag(id).await
    }

    /// List all tags alphabetically
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.repo.list_tags().await
    }

    /// Rename a tag. Fails if another tag already uses the new name.
    pub async fn rename_tag(&self, id: &str, new_name: &str) -> Result<Tag> {
        let new_name = validate_name(new_name)?;

        if let Some(existing) = self.repo.get_tag_by_name(new_name).await? {
            if existing.id != id {
                return Err(AppError::Validation(format!(
                    "A tag named '{}' already exists",
                    new_name
                )));
            }
        }

        tracing::debug!("Renaming tag {} to '{}'", id, new_name);

        self.repo.rename_tag(id, new_name).await
    }

    /// Change a tag's color
    pub async fn set_color(&self, id: &str, color: &str) -> Result<Tag> {
        self.repo.set_tag_color(id, color).await
    }

    /// Delete a tag; links to diaries go with it
    pub async fn delete_tag(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting tag: {}", id);

        self.repo.delete_tag(id).await
    }

    /// Remove tags no diary references anymore. Returns how many went.
    pub async fn prune_unused(&self) -> Result<i64> {
        let pruned = self.repo.prune_unused_tags().await?;

        if pruned > 0 {
            tracing::info!("Pruned {} unused tags", pruned);
        }

        Ok(pruned)
    }

    /// List all diary entries carrying a tag
    pub async fn diaries_for_tag(&self, tag_id: &str) -> Result<Vec<Diary>> {
        // Surface a tag error rather than an empty list for bad ids
        self.repo.get_tag(tag_id).await?;
        self.repo.list_diaries_by_tag(tag_id).await
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Tag name cannot be empty".to_string()));
    }
    if name.chars().count() > config::MAX_TAG_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Tag name exceeds maximum length of {} characters",
            config::MAX_TAG_NAME_LENGTH
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, CreateDiaryRequest, Repository};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (TagsService, Repository) {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        (TagsService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_create_and_list_tags() {
        let (service, _repo) = create_test_service().await;

        service.create_tag("work", "#ff0000").await.unwrap();
        service.create_tag("home", "#00ff00").await.unwrap();

        let tags = service.list_tags().await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "home");
        assert_eq!(tags[1].name, "work");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let (service, _repo) = create_test_service().await;

        service.create_tag("work", "#ff0000").await.unwrap();
        let result = service.create_tag("Work", "#00ff00").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, _repo) = create_test_service().await;

        let result = service.create_tag("  ", "#ff0000").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rename_tag() {
        let (service, _repo) = create_test_service().await;

        let tag = service.create_tag("wokr", "#ff0000").await.unwrap();
        let renamed = service.rename_tag(&tag.id, "work").await.unwrap();

        assert_eq!(renamed.id, tag.id);
        assert_eq!(renamed.name, "work");
    }

    #[tokio::test]
    async fn test_rename_collision_is_rejected() {
        let (service, _repo) = create_test_service().await;

        service.create_tag("work", "#ff0000").await.unwrap();
        let other = service.create_tag("play", "#00ff00").await.unwrap();

        let result = service.rename_tag(&other.id, "WORK").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rename_to_own_name_changes_case() {
        let (service, _repo) = create_test_service().await;

        let tag = service.create_tag("work", "#ff0000").await.unwrap();
        let renamed = service.rename_tag(&tag.id, "Work").await.unwrap();

        assert_eq!(renamed.name, "Work");
    }

    #[tokio::test]
    async fn test_prune_unused_keeps_attached_tags() {
        let (service, repo) = create_test_service().await;

        let diary = repo
            .create_diary(CreateDiaryRequest {
                title: "Entry".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let used = service.create_tag("used", "#ff0000").await.unwrap();
        service.create_tag("dangling", "#00ff00").await.unwrap();
        repo.attach_tag(&diary.id, &used.id).await.unwrap();

        let pruned = service.prune_unused().await.unwrap();

        assert_eq!(pruned, 1);
        let remaining = service.list_tags().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "used");
    }

    #[tokio::test]
    async fn test_diaries_for_unknown_tag_fails() {
        let (service, _repo) = create_test_service().await;

        let result = service.diaries_for_tag("no-such-tag").await;

        assert!(matches!(result, Err(AppError::TagNotFound(_))));
    }
}
