//! Error types for the daybook application
//!
//! All errors use thiserror for structured error handling.
//! Data-layer failures are caught at the command boundary and
//! rendered as a single user-facing message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Diary not found: {0}")]
    DiaryNotFound(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Todo not found: {0}")]
    TodoNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Restore error: {0}")]
    Restore(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
