//! Categories service
//!
//! Thin business layer over category storage. Categories are optional
//! grouping for diary entries; deleting one leaves its entries intact.

use crate::database::{Category, Diary, Repository};
use crate::error::{AppError, Result};

/// Service for managing categories
#[derive(Clone)]
pub struct CategoriesService {
    repo: Repository,
}

impl CategoriesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a category
    pub async fn create_category(
        &self,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        self.repo.create_category(name, icon, color).await
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: &str) -> Result<Category> {
        self.repo.get_category(id).await
    }

    /// List all categories alphabetically
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.repo.list_categories().await
    }

    /// Update a category's fields
    pub async fn update_category(
        &self,
        id: &str,
        name: Option<&str>,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Category> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(
                    "Category name cannot be empty".to_string(),
                ));
            }
        }

        self.repo
            .update_category(id, name.map(str::trim), icon, color)
            .await
    }

    /// Delete a category. Member entries survive uncategorized.
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting category: {}", id);

        self.repo.delete_category(id).await
    }

    /// List all diary entries in a category
    pub async fn diaries_in_category(&self, id: &str) -> Result<Vec<Diary>> {
        self.repo.get_category(id).await?;
        self.repo.list_diaries_by_category(id).await
    }
}
