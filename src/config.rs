//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the application.

use std::time::Duration;

// ===== Diary Limits =====

/// Maximum length for a diary title in characters.
/// Longer titles break list rendering and serve no purpose.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for diary content in bytes (1 MiB).
pub const MAX_CONTENT_LENGTH: usize = 1_048_576;

/// Maximum number of attached image paths per diary.
pub const MAX_IMAGES_PER_DIARY: usize = 20;

// ===== Tag Limits =====

/// Maximum length for a tag name.
pub const MAX_TAG_NAME_LENGTH: usize = 50;

// ===== Settings =====

/// Valid view modes for the diary list.
pub const VALID_VIEW_MODES: &[&str] = &["list", "grid"];

/// Default accent color applied to new diaries.
pub const DEFAULT_DIARY_COLOR: &str = "#4a90d9";

/// Color given to tags created implicitly while tagging a diary.
pub const DEFAULT_TAG_COLOR: &str = "#9e9e9e";

/// How long a cached settings row stays valid before being re-read
/// from the database.
pub const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(30);

// ===== Backup =====

/// Number of backup archives kept before the oldest are pruned.
pub const BACKUP_RETENTION_COUNT: usize = 10;

/// Name of the database file inside the data directory and inside
/// backup archives.
pub const DATABASE_FILE_NAME: &str = "daybook.db";

// ===== Search =====

/// Score weight for a query hit in the diary title.
pub const SCORE_TITLE_HIT: f64 = 3.0;

/// Score weight for a query hit in the diary content.
pub const SCORE_CONTENT_HIT: f64 = 1.0;

/// Score weight for a query hit on an attached tag name.
pub const SCORE_TAG_HIT: f64 = 2.0;

/// Bonus applied when the query matches a whole word in the title.
pub const SCORE_WHOLE_WORD_BONUS: f64 = 1.5;

/// Bonus applied to favorite diaries in search results.
pub const SCORE_FAVORITE_BONUS: f64 = 0.5;

/// Bonus applied to diaries updated within the last week.
pub const SCORE_RECENCY_BONUS: f64 = 0.75;
