//! Backup service
//!
//! Creates consistent snapshots of the database file, packaged as ZIP
//! archives with a manifest and SHA-256 checksums. Restore verifies
//! every checksum before touching the live data directory, and must
//! only run while no connection pool is open against it.

use crate::config;
use crate::database::{Backup, Repository};
use crate::error::{AppError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Backup manifest structure
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupManifest {
    pub version: String,
    pub timestamp: String,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub checksum: String,
}

/// Backup service
#[derive(Clone)]
pub struct BackupService {
    repo: Repository,
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention_count: usize,
}

impl BackupService {
    pub fn new(repo: Repository, data_dir: PathBuf) -> Self {
        let backups_dir = data_dir.join("backups");
        Self {
            repo,
            data_dir,
            backups_dir,
            retention_count: config::BACKUP_RETENTION_COUNT,
        }
    }

    #[cfg(test)]
    fn with_retention(mut self, count: usize) -> Self {
        self.retention_count = count;
        self
    }

    /// Create a backup archive and record it
    pub async fn create_backup(&self) -> Result<Backup> {
        tracing::info!("Creating backup");

        fs::create_dir_all(&self.backups_dir).await?;

        let db_path = self.data_dir.join(config::DATABASE_FILE_NAME);
        if !fs::try_exists(&db_path).await? {
            return Err(AppError::Backup(format!(
                "No database file at {:?}",
                db_path
            )));
        }

        // Fold the WAL into the main file before copying it
        self.repo.checkpoint().await?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_path = self.backup_path_for(&timestamp).await;

        let mut manifest = BackupManifest {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
            files: Vec::new(),
        };

        let archive_file = std::fs::File::create(&backup_path)?;
        let mut zip = ZipWriter::new(archive_file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let db_data = fs::read(&db_path).await?;
        let db_checksum = calculate_checksum(&db_data);

        zip.start_file(config::DATABASE_FILE_NAME, options)?;
        std::io::Write::write_all(&mut zip, &db_data)?;

        manifest.files.push(FileEntry {
            path: config::DATABASE_FILE_NAME.to_string(),
            size: db_data.len() as u64,
            checksum: db_checksum,
        });

        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        let manifest_checksum = calculate_checksum(manifest_json.as_bytes());

        zip.start_file("manifest.json", options)?;
        std::io::Write::write_all(&mut zip, manifest_json.as_bytes())?;

        zip.finish()?;

        let size = fs::metadata(&backup_path).await?.len() as i64;

        let backup = self
            .repo
            .record_backup(
                backup_path.to_string_lossy().as_ref(),
                size,
                &manifest_checksum,
            )
            .await?;

        tracing::info!("Backup created: {:?} ({} bytes)", backup_path, size);

        self.apply_retention_policy().await?;

        Ok(backup)
    }

    /// Backups created within the same second get a numeric suffix
    /// instead of overwriting each other.
    async fn backup_path_for(&self, timestamp: &str) -> PathBuf {
        let mut path = self.backups_dir.join(format!("backup_{}.zip", timestamp));
        let mut counter = 1;

        while fs::try_exists(&path).await.unwrap_or(false) {
            path = self
                .backups_dir
                .join(format!("backup_{}_{}.zip", timestamp, counter));
            counter += 1;
        }

        path
    }

    /// Keep only the newest archives; older files and their records go
    async fn apply_retention_policy(&self) -> Result<()> {
        let mut backups = self.repo.list_backups().await?;
        if backups.len() <= self.retention_count {
            return Ok(());
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        for backup in backups.iter().skip(self.retention_count) {
            tracing::info!("Pruning old backup: {}", backup.path);

            if let Err(e) = fs::remove_file(&backup.path).await {
                tracing::warn!("Failed to delete backup file {}: {}", backup.path, e);
            }
            self.repo.delete_backup_record(&backup.id).await?;
        }

        Ok(())
    }

    /// List recorded backups, newest first
    pub async fn list_backups(&self) -> Result<Vec<Backup>> {
        self.repo.list_backups().await
    }

    /// Restore a backup archive into a data directory.
    ///
    /// The caller must guarantee that no connection pool is open
    /// against `data_dir` while this runs.
    pub async fn restore_backup(backup_path: &Path, data_dir: &Path) -> Result<()> {
        tracing::info!("Restoring from backup: {:?}", backup_path);

        let archive_data = fs::read(backup_path).await.map_err(|e| {
            AppError::Restore(format!("Cannot read backup {:?}: {}", backup_path, e))
        })?;

        let cursor = std::io::Cursor::new(archive_data);
        let mut archive = zip::ZipArchive::new(cursor)?;

        let manifest: BackupManifest = {
            let mut file = archive
                .by_name("manifest.json")
                .map_err(|_| AppError::Restore("Backup has no manifest".to_string()))?;
            let mut data = String::new();
            std::io::Read::read_to_string(&mut file, &mut data)?;
            serde_json::from_str(&data)?
        };

        tracing::info!(
            "Backup version {}, created {}, {} files",
            manifest.version,
            manifest.timestamp,
            manifest.files.len()
        );

        let db_entry = manifest
            .files
            .iter()
            .find(|f| f.path == config::DATABASE_FILE_NAME)
            .ok_or_else(|| {
                AppError::Restore("Backup does not contain a database file".to_string())
            })?;

        let contents = {
            let mut file = archive.by_name(&db_entry.path)?;
            let mut contents = Vec::new();
            std::io::Read::read_to_end(&mut file, &mut contents)?;
            contents
        };

        let actual = calculate_checksum(&contents);
        if actual != db_entry.checksum {
            return Err(AppError::Restore(format!(
                "Checksum mismatch for {}: expected {}, got {}",
                db_entry.path, db_entry.checksum, actual
            )));
        }

        fs::create_dir_all(data_dir).await?;

        // Move the live database aside before the swap; the copy stays
        // around as a manual escape hatch.
        let db_path = data_dir.join(config::DATABASE_FILE_NAME);
        if fs::try_exists(&db_path).await? {
            let aside = data_dir.join(format!(
                "{}.pre_restore_{}",
                config::DATABASE_FILE_NAME,
                Utc::now().timestamp()
            ));
            fs::rename(&db_path, &aside).await?;
            tracing::info!("Previous database kept at {:?}", aside);
        }

        // Stale WAL sidecars would shadow the restored file
        for suffix in ["-wal", "-shm"] {
            let sidecar =
                data_dir.join(format!("{}{}", config::DATABASE_FILE_NAME, suffix));
            let _ = fs::remove_file(&sidecar).await;
        }

        fs::write(&db_path, &contents).await?;

        tracing::info!("Restore completed successfully");

        Ok(())
    }
}

fn calculate_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, CreateDiaryRequest, Repository};
    use tempfile::TempDir;

    async fn create_test_service() -> (BackupService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        let pool = create_pool(&data_dir.join(config::DATABASE_FILE_NAME))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let service = BackupService::new(repo, data_dir);

        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_create_backup_writes_archive_and_record() {
        let (service, _temp) = create_test_service().await;

        service
            .repo
            .create_diary(CreateDiaryRequest {
                title: "Entry".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let backup = service.create_backup().await.unwrap();

        assert!(Path::new(&backup.path).exists());
        assert!(backup.path.contains("backup_"));
        assert!(backup.size > 0);

        let listed = service.list_backups().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, backup.id);
    }

    #[tokio::test]
    async fn test_backup_contains_verifiable_manifest() {
        let (service, _temp) = create_test_service().await;

        let backup = service.create_backup().await.unwrap();

        let data = fs::read(&backup.path).await.unwrap();
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let manifest: BackupManifest = {
            let mut file = archive.by_name("manifest.json").unwrap();
            let mut text = String::new();
            std::io::Read::read_to_string(&mut file, &mut text).unwrap();
            serde_json::from_str(&text).unwrap()
        };

        assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.files[0].path, config::DATABASE_FILE_NAME);

        let mut db_file = archive.by_name(config::DATABASE_FILE_NAME).unwrap();
        let mut contents = Vec::new();
        std::io::Read::read_to_end(&mut db_file, &mut contents).unwrap();

        assert_eq!(calculate_checksum(&contents), manifest.files[0].checksum);
    }

    #[tokio::test]
    async fn test_retention_prunes_oldest() {
        let (service, _temp) = create_test_service().await;
        let service = service.with_retention(2);

        for _ in 0..4 {
            service.create_backup().await.unwrap();
        }

        let backups = service.list_backups().await.unwrap();
        assert_eq!(backups.len(), 2);

        for backup in &backups {
            assert!(Path::new(&backup.path).exists());
        }
    }

    #[tokio::test]
    async fn test_same_second_backups_get_distinct_names() {
        let (service, _temp) = create_test_service().await;

        let a = service.create_backup().await.unwrap();
        let b = service.create_backup().await.unwrap();

        assert_ne!(a.path, b.path);
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let (service, temp) = create_test_service().await;

        let diary = service
            .repo
            .create_diary(CreateDiaryRequest {
                title: "Before backup".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let backup = service.create_backup().await.unwrap();

        // Restore into a fresh directory and open it
        let restore_dir = temp.path().join("restored");
        BackupService::restore_backup(Path::new(&backup.path), &restore_dir)
            .await
            .unwrap();

        let pool = create_pool(&restore_dir.join(config::DATABASE_FILE_NAME))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let recovered = repo.get_diary(&diary.id).await.unwrap();
        assert_eq!(recovered.title, "Before backup");
    }

    #[tokio::test]
    async fn test_restore_rejects_corrupted_archive() {
        let (service, temp) = create_test_service().await;

        let backup = service.create_backup().await.unwrap();

        let mut data = fs::read(&backup.path).await.unwrap();
        let mid = data.len() / 2;
        data[mid] ^= 0xFF;
        fs::write(&backup.path, &data).await.unwrap();

        let result =
            BackupService::restore_backup(Path::new(&backup.path), &temp.path().join("out"))
                .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_restore_missing_file_fails() {
        let temp = TempDir::new().unwrap();

        let result = BackupService::restore_backup(
            Path::new("/definitely/not/a/backup.zip"),
            temp.path(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Restore(_))));
    }
}
