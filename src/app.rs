//! Application state and initialization
//!
//! All services are built here, once, around a shared repository.
//! Commands receive the state and never touch the pool directly.

use crate::database::{create_pool, Repository};
use crate::error::{AppError, Result};
use crate::services::{
    BackupService, CategoriesService, DiariesService, SettingsService, TagsService, TodosService,
    TransferService,
};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub repo: Repository,
    pub diaries: DiariesService,
    pub tags: TagsService,
    pub todos: TodosService,
    pub categories: CategoriesService,
    pub settings: SettingsService,
    pub backup: BackupService,
    pub transfer: TransferService,
}

impl AppState {
    /// Open the database under `data_dir` and wire up every service
    pub async fn initialize(data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application, data directory: {:?}", data_dir);

        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join(crate::config::DATABASE_FILE_NAME);
        let pool = create_pool(&db_path).await?;
        let repo = Repository::new(pool);

        let state = Self {
            diaries: DiariesService::new(repo.clone()),
            tags: TagsService::new(repo.clone()),
            todos: TodosService::new(repo.clone()),
            categories: CategoriesService::new(repo.clone()),
            settings: SettingsService::new(repo.clone()),
            backup: BackupService::new(repo.clone(), data_dir.clone()),
            transfer: TransferService::new(repo.clone()),
            repo,
            data_dir,
        };

        tracing::info!("Application initialized successfully");

        Ok(state)
    }
}

/// Platform data directory for the application
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "daybook")
        .ok_or_else(|| AppError::Generic("Cannot determine a home directory".to_string()))?;

    Ok(dirs.data_dir().to_path_buf())
}
