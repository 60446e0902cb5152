//! Settings service
//!
//! Validated access to the single settings row, read through a short
//! TTL cache so hot paths do not hit the database for every lookup.
//! Writes go straight through and invalidate the cache.

use crate::cache::TtlCache;
use crate::config;
use crate::database::{Repository, Settings, UpdateSettingsRequest};
use crate::error::{AppError, Result};
use std::sync::Arc;

/// Service for reading and updating application settings
#[derive(Clone)]
pub struct SettingsService {
    repo: Repository,
    cache: Arc<TtlCache<(), Settings>>,
}

impl SettingsService {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            cache: Arc::new(TtlCache::new(config::SETTINGS_CACHE_TTL)),
        }
    }

    /// Get the current settings, served from cache when fresh
    pub async fn get_settings(&self) -> Result<Settings> {
        if let Some(settings) = self.cache.get(&()) {
            return Ok(settings);
        }

        let settings = self.repo.get_settings().await?;
        self.cache.insert((), settings.clone());

        Ok(settings)
    }

    /// Update settings; only fields present in the request change
    pub async fn update_settings(&self, req: UpdateSettingsRequest) -> Result<Settings> {
        if let Some(view_mode) = &req.view_mode {
            if !config::VALID_VIEW_MODES.contains(&view_mode.as_str()) {
                return Err(AppError::Validation(format!(
                    "Unknown view mode '{}', expected one of: {}",
                    view_mode,
                    config::VALID_VIEW_MODES.join(", ")
                )));
            }
        }
        if let Some(color) = &req.default_color {
            validate_hex_color(color)?;
        }

        tracing::info!("Updating settings");

        let settings = self.repo.update_settings(req).await?;
        self.cache.invalidate(&());

        Ok(settings)
    }
}

/// Accept only #rrggbb colors, the format the frontends emit
fn validate_hex_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(AppError::Validation(format!(
            "Invalid color '{}', expected #rrggbb",
            color
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Repository};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (SettingsService, Repository) {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        (SettingsService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_defaults_on_first_read() {
        let (service, _repo) = create_test_service().await;

        let settings = service.get_settings().await.unwrap();

        assert_eq!(settings.view_mode, "list");
        assert!(!settings.dark_mode);
        assert_eq!(settings.default_color, config::DEFAULT_DIARY_COLOR);
    }

    #[tokio::test]
    async fn test_update_and_read_back() {
        let (service, _repo) = create_test_service().await;

        service
            .update_settings(UpdateSettingsRequest {
                view_mode: Some("grid".to_string()),
                dark_mode: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let settings = service.get_settings().await.unwrap();

        assert_eq!(settings.view_mode, "grid");
        assert!(settings.dark_mode);
    }

    #[tokio::test]
    async fn test_invalid_view_mode_rejected() {
        let (service, _repo) = create_test_service().await;

        let result = service
            .update_settings(UpdateSettingsRequest {
                view_mode: Some("carousel".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalid_color_rejected() {
        let (service, _repo) = create_test_service().await;

        for bad in ["red", "#12345", "#12345g", "4a90d9"] {
            let result = service
                .update_settings(UpdateSettingsRequest {
                    default_color: Some(bad.to_string()),
                    ..Default::default()
                })
                .await;

            assert!(matches!(result, Err(AppError::Validation(_))), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_update_invalidates_cache() {
        let (service, _repo) = create_test_service().await;

        // Warm the cache
        let before = service.get_settings().await.unwrap();
        assert!(!before.card_view);

        service
            .update_settings(UpdateSettingsRequest {
                card_view: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let after = service.get_settings().await.unwrap();
        assert!(after.card_view);
    }

    #[tokio::test]
    async fn test_cache_does_not_see_external_writes() {
        let (service, repo) = create_test_service().await;

        let before = service.get_settings().await.unwrap();
        assert_eq!(before.view_mode, "list");

        // A write bypassing the service is invisible until the TTL lapses
        repo.update_settings(UpdateSettingsRequest {
            view_mode: Some("grid".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        let cached = service.get_settings().await.unwrap();
        assert_eq!(cached.view_mode, "list");
    }
}
