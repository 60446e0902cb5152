//! Backup commands
//!
//! Restore is handled in main before any pool is opened; only create
//! and list run against live application state.

use super::short_id;
use crate::app::AppState;
use crate::error::Result;

pub async fn create(state: &AppState) -> Result<()> {
    let backup = state.backup.create_backup().await?;

    println!("Backup written to {}", backup.path);
    println!("{} bytes, manifest {}", backup.size, backup.manifest_hash);

    Ok(())
}

pub async fn list(state: &AppState) -> Result<()> {
    let backups = state.backup.list_backups().await?;

    if backups.is_empty() {
        println!("No backups recorded");
        return Ok(());
    }

    for backup in &backups {
        println!(
            "{}  {}  {:>10} bytes  {}",
            short_id(&backup.id),
            backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
            backup.size,
            backup.path
        );
    }

    Ok(())
}
