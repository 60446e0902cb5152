//! Services module
//!
//! Business logic services that coordinate between commands and repository.

pub mod backup;
pub mod categories;
pub mod diaries;
pub mod search;
pub mod settings;
pub mod tags;
pub mod todos;
pub mod transfer;

pub use backup::BackupService;
pub use categories::CategoriesService;
pub use diaries::DiariesService;
pub use search::{DiaryFilter, SortDirection, SortKey};
pub use settings::SettingsService;
pub use tags::TagsService;
pub use todos::TodosService;
pub use transfer::TransferService;
