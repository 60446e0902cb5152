//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization at the command boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Mood recorded on a diary entry, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Neutral,
    Sad,
    Awful,
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "neutral" => Ok(Mood::Neutral),
            "sad" => Ok(Mood::Sad),
            "awful" => Ok(Mood::Awful),
            other => Err(format!(
                "unknown mood '{}' (expected great, good, neutral, sad or awful)",
                other
            )),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Awful => "awful",
        };
        f.write_str(s)
    }
}

/// Weather recorded on a diary entry, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
    Windy,
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunny" => Ok(Weather::Sunny),
            "cloudy" => Ok(Weather::Cloudy),
            "rainy" => Ok(Weather::Rainy),
            "snowy" => Ok(Weather::Snowy),
            "stormy" => Ok(Weather::Stormy),
            "windy" => Ok(Weather::Windy),
            other => Err(format!(
                "unknown weather '{}' (expected sunny, cloudy, rainy, snowy, stormy or windy)",
                other
            )),
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Snowy => "snowy",
            Weather::Stormy => "stormy",
            Weather::Windy => "windy",
        };
        f.write_str(s)
    }
}

/// A diary entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Diary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub mood: Option<Mood>,
    pub weather: Option<Weather>,
    pub location: Option<String>,
    pub favorite: bool,
    pub pinned: bool,
    /// Paths of attached images, stored as a JSON array
    pub images: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A diary entry together with its attached tags
#[derive(Debug, Clone, Serialize)]
pub struct DiaryWithTags {
    #[serde(flatten)]
    pub diary: Diary,
    pub tags: Vec<Tag>,
}

/// Create diary request
#[derive(Debug, Default, Deserialize)]
pub struct CreateDiaryRequest {
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub mood: Option<Mood>,
    pub weather: Option<Weather>,
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Update diary request; `None` fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDiaryRequest {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<String>,
    /// Clears the category instead of updating it
    #[serde(default)]
    pub clear_category: bool,
    pub mood: Option<Mood>,
    pub weather: Option<Weather>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
}

/// A user-defined label attachable to diaries many-to-many
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A simple task entity independent of diaries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create todo request
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub content: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Update todo request; `None` fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Clears the due date instead of updating it
    #[serde(default)]
    pub clear_due_date: bool,
}

/// A grouping for diary entries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Single-row application settings, materialized lazily on first read
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settings {
    pub id: i64,
    pub view_mode: String,
    pub dark_mode: bool,
    pub card_view: bool,
    pub default_color: String,
}

/// Fields of the settings row that can be changed
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub view_mode: Option<String>,
    pub dark_mode: Option<bool>,
    pub card_view: Option<bool>,
    pub default_color: Option<String>,
}

/// Backup record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Backup {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub size: i64,
    pub manifest_hash: String,
}
