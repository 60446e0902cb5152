//! Import and export commands

use crate::app::AppState;
use crate::error::Result;
use std::path::Path;

pub async fn export(state: &AppState, dir: &Path) -> Result<()> {
    let written = state.transfer.export_all(dir).await?;
    println!("Exported {} entries to {}", written.len(), dir.display());
    Ok(())
}

pub async fn import(state: &AppState, path: &Path) -> Result<()> {
    let report = state.transfer.import(path).await?;

    println!("Imported {} entries", report.imported);
    if report.skipped > 0 {
        println!("Skipped {} files (see log for details)", report.skipped);
    }

    Ok(())
}
