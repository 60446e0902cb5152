//! Repository layer for database operations
//!
//! This module provides CRUD operations for all entities. Every query is
//! parameterized; every mutation publishes a change event so observable
//! query results can be recomputed.

use super::events::{ChangeNotifier, DataEvent};
use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Subscribe to table change events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DataEvent> {
        self.notifier.subscribe()
    }

    // ===== Diaries =====

    /// Create a new diary entry
    pub async fn create_diary(&self, req: CreateDiaryRequest) -> Result<Diary> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let diary = sqlx::query_as::<_, Diary>(
            r#"
            INSERT INTO diaries
                (id, title, content, category_id, mood, weather, location,
                 favorite, pinned, images, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.category_id)
        .bind(req.mood)
        .bind(req.weather)
        .bind(&req.location)
        .bind(Json(req.images))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created diary: {}", id);
        self.notifier.notify(DataEvent::Diaries);
        Ok(diary)
    }

    /// Get a diary by ID
    pub async fn get_diary(&self, id: &str) -> Result<Diary> {
        let diary = sqlx::query_as::<_, Diary>("SELECT * FROM diaries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::DiaryNotFound(id.to_string()))?;

        Ok(diary)
    }

    /// List all diaries, pinned entries first, newest first within each group
    pub async fn list_diaries(&self) -> Result<Vec<Diary>> {
        let diaries = sqlx::query_as::<_, Diary>(
            r#"
            SELECT * FROM diaries
            ORDER BY pinned DESC, updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(diaries)
    }

    /// List diaries carrying the given tag
    pub async fn list_diaries_by_tag(&self, tag_id: &str) -> Result<Vec<Diary>> {
        let diaries = sqlx::query_as::<_, Diary>(
            r#"
            SELECT d.* FROM diaries d
            JOIN diary_tags dt ON dt.diary_id = d.id
            WHERE dt.tag_id = ?
            ORDER BY d.pinned DESC, d.updated_at DESC
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(diaries)
    }

    /// List diaries in the given category
    pub async fn list_diaries_by_category(&self, category_id: &str) -> Result<Vec<Diary>> {
        let diaries = sqlx::query_as::<_, Diary>(
            r#"
            SELECT * FROM diaries
            WHERE category_id = ?
            ORDER BY pinned DESC, updated_at DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(diaries)
    }

    /// Update a diary; only fields present in the request are touched
    pub async fn update_diary(&self, req: UpdateDiaryRequest) -> Result<Diary> {
        let now = Utc::now();

        // Build dynamic update query
        let mut sql = "UPDATE diaries SET updated_at = ?".to_string();

        if req.title.is_some() {
            sql.push_str(", title = ?");
        }
        if req.content.is_some() {
            sql.push_str(", content = ?");
        }
        if req.clear_category {
            sql.push_str(", category_id = NULL");
        } else if req.category_id.is_some() {
            sql.push_str(", category_id = ?");
        }
        if req.mood.is_some() {
            sql.push_str(", mood = ?");
        }
        if req.weather.is_some() {
            sql.push_str(", weather = ?");
        }
        if req.location.is_some() {
            sql.push_str(", location = ?");
        }
        if req.images.is_some() {
            sql.push_str(", images = ?");
        }
        sql.push_str(" WHERE id = ?");

        // Bind in the same order the placeholders were appended
        let mut q = sqlx::query(&sql).bind(now);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }
        if !req.clear_category {
            if let Some(category_id) = &req.category_id {
                q = q.bind(category_id);
            }
        }
        if let Some(mood) = req.mood {
            q = q.bind(mood);
        }
        if let Some(weather) = req.weather {
            q = q.bind(weather);
        }
        if let Some(location) = &req.location {
            q = q.bind(location);
        }
        if let Some(images) = req.images.clone() {
            q = q.bind(Json(images));
        }

        let rows_affected = q.bind(&req.id).execute(&self.pool).await?.rows_affected();

        if rows_affected == 0 {
            return Err(AppError::DiaryNotFound(req.id));
        }

        self.notifier.notify(DataEvent::Diaries);
        self.get_diary(&req.id).await
    }

    /// Set the favorite flag on a diary
    pub async fn set_diary_favorite(&self, id: &str, favorite: bool) -> Result<()> {
        let rows = sqlx::query("UPDATE diaries SET favorite = ? WHERE id = ?")
            .bind(favorite)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::DiaryNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    /// Set the pinned flag on a diary
    pub async fn set_diary_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        let rows = sqlx::query("UPDATE diaries SET pinned = ? WHERE id = ?")
            .bind(pinned)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::DiaryNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    /// Delete a diary; the diary_tags cascade clears its links
    pub async fn delete_diary(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM diaries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::DiaryNotFound(id.to_string()));
        }

        tracing::debug!("Deleted diary: {}", id);
        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    /// Count diary entries
    pub async fn count_diaries(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diaries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // ===== Tags =====

    /// Create a tag
    pub async fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, color, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(color)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created tag: {} ({})", name, id);
        self.notifier.notify(DataEvent::Tags);
        Ok(tag)
    }

    /// Get a tag by ID
    pub async fn get_tag(&self, id: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::TagNotFound(id.to_string()))?;

        Ok(tag)
    }

    /// Look up a tag by name, case-insensitively
    pub async fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    /// Get a tag by name or create it. Uniqueness of tag names is enforced
    /// here, not by a schema constraint.
    pub async fn get_or_create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        if let Some(tag) = self.get_tag_by_name(name).await? {
            return Ok(tag);
        }
        self.create_tag(name, color).await
    }

    /// List all tags alphabetically
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await?;

        Ok(tags)
    }

    /// Rename a tag
    pub async fn rename_tag(&self, id: &str, name: &str) -> Result<Tag> {
        let rows = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TagNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Tags);
        self.get_tag(id).await
    }

    /// Change a tag's color
    pub async fn set_tag_color(&self, id: &str, color: &str) -> Result<Tag> {
        let rows = sqlx::query("UPDATE tags SET color = ? WHERE id = ?")
            .bind(color)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TagNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Tags);
        self.get_tag(id).await
    }

    /// Delete a tag; the diary_tags cascade clears its links
    pub async fn delete_tag(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TagNotFound(id.to_string()));
        }

        tracing::debug!("Deleted tag: {}", id);
        self.notifier.notify(DataEvent::Tags);
        Ok(())
    }

    /// Delete tags not linked to any diary, returning how many were removed
    pub async fn prune_unused_tags(&self) -> Result<i64> {
        let rows = sqlx::query(
            "DELETE FROM tags WHERE id NOT IN (SELECT DISTINCT tag_id FROM diary_tags)",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows > 0 {
            self.notifier.notify(DataEvent::Tags);
        }
        Ok(rows as i64)
    }

    /// Tags attached to a diary, alphabetically
    pub async fn tags_for_diary(&self, diary_id: &str) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.* FROM tags t
            JOIN diary_tags dt ON dt.tag_id = t.id
            WHERE dt.diary_id = ?
            ORDER BY t.name COLLATE NOCASE
            "#,
        )
        .bind(diary_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Link a tag to a diary. Foreign keys reject links to missing rows.
    pub async fn attach_tag(&self, diary_id: &str, tag_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO diary_tags (diary_id, tag_id) VALUES (?, ?)")
            .bind(diary_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Attached tag {} to diary {}", tag_id, diary_id);
        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    /// Unlink a tag from a diary
    pub async fn detach_tag(&self, diary_id: &str, tag_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM diary_tags WHERE diary_id = ? AND tag_id = ?")
            .bind(diary_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Detached tag {} from diary {}", tag_id, diary_id);
        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    // ===== Todos =====

    /// Create a todo
    pub async fn create_todo(&self, req: CreateTodoRequest) -> Result<Todo> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, title, content, completed, due_date, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created todo: {}", id);
        self.notifier.notify(DataEvent::Todos);
        Ok(todo)
    }

    /// Get a todo by ID
    pub async fn get_todo(&self, id: &str) -> Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::TodoNotFound(id.to_string()))?;

        Ok(todo)
    }

    /// List todos: open before done, due-dated before undated, soonest first
    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT * FROM todos
            ORDER BY completed ASC,
                     CASE WHEN due_date IS NULL THEN 1 ELSE 0 END,
                     due_date ASC,
                     created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Update a todo; only fields present in the request are touched
    pub async fn update_todo(&self, req: UpdateTodoRequest) -> Result<Todo> {
        let now = Utc::now();

        let mut sql = "UPDATE todos SET updated_at = ?".to_string();

        if req.title.is_some() {
            sql.push_str(", title = ?");
        }
        if req.content.is_some() {
            sql.push_str(", content = ?");
        }
        if req.clear_due_date {
            sql.push_str(", due_date = NULL");
        } else if req.due_date.is_some() {
            sql.push_str(", due_date = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut q = sqlx::query(&sql).bind(now);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }
        if !req.clear_due_date {
            if let Some(due_date) = req.due_date {
                q = q.bind(due_date);
            }
        }

        let rows_affected = q.bind(&req.id).execute(&self.pool).await?.rows_affected();

        if rows_affected == 0 {
            return Err(AppError::TodoNotFound(req.id));
        }

        self.notifier.notify(DataEvent::Todos);
        self.get_todo(&req.id).await
    }

    /// Mark a todo complete or open again
    pub async fn set_todo_completed(&self, id: &str, completed: bool) -> Result<()> {
        let now = Utc::now();

        let rows = sqlx::query("UPDATE todos SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(completed)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TodoNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Todos);
        Ok(())
    }

    /// Delete a todo
    pub async fn delete_todo(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::TodoNotFound(id.to_string()));
        }

        tracing::debug!("Deleted todo: {}", id);
        self.notifier.notify(DataEvent::Todos);
        Ok(())
    }

    // ===== Categories =====

    /// Create a category
    pub async fn create_category(
        &self,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Category> {
        let id = Uuid::new_v4().to_string();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, icon, color)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(icon)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created category: {} ({})", name, id);
        self.notifier.notify(DataEvent::Categories);
        Ok(category)
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))?;

        Ok(category)
    }

    /// List all categories alphabetically
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Update a category's fields
    pub async fn update_category(
        &self,
        id: &str,
        name: Option<&str>,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Category> {
        let mut sql = "UPDATE categories SET id = id".to_string();

        if name.is_some() {
            sql.push_str(", name = ?");
        }
        if icon.is_some() {
            sql.push_str(", icon = ?");
        }
        if color.is_some() {
            sql.push_str(", color = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut q = sqlx::query(&sql);
        if let Some(name) = name {
            q = q.bind(name);
        }
        if let Some(icon) = icon {
            q = q.bind(icon);
        }
        if let Some(color) = color {
            q = q.bind(color);
        }

        let rows = q.bind(id).execute(&self.pool).await?.rows_affected();

        if rows == 0 {
            return Err(AppError::CategoryNotFound(id.to_string()));
        }

        self.notifier.notify(DataEvent::Categories);
        self.get_category(id).await
    }

    /// Delete a category. Diaries in it survive with their category cleared
    /// by the ON DELETE SET NULL foreign key.
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::CategoryNotFound(id.to_string()));
        }

        tracing::debug!("Deleted category: {}", id);
        self.notifier.notify(DataEvent::Categories);
        self.notifier.notify(DataEvent::Diaries);
        Ok(())
    }

    // ===== Settings =====

    /// Read the settings row, materializing it with defaults on first read
    pub async fn get_settings(&self) -> Result<Settings> {
        sqlx::query("INSERT OR IGNORE INTO settings (id) VALUES (1)")
            .execute(&self.pool)
            .await?;

        let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(settings)
    }

    /// Update the settings row; only fields present in the request change
    pub async fn update_settings(&self, req: UpdateSettingsRequest) -> Result<Settings> {
        // Make sure the row exists before updating it
        self.get_settings().await?;

        let mut sql = "UPDATE settings SET id = 1".to_string();

        if req.view_mode.is_some() {
            sql.push_str(", view_mode = ?");
        }
        if req.dark_mode.is_some() {
            sql.push_str(", dark_mode = ?");
        }
        if req.card_view.is_some() {
            sql.push_str(", card_view = ?");
        }
        if req.default_color.is_some() {
            sql.push_str(", default_color = ?");
        }
        sql.push_str(" WHERE id = 1");

        let mut q = sqlx::query(&sql);
        if let Some(view_mode) = &req.view_mode {
            q = q.bind(view_mode);
        }
        if let Some(dark_mode) = req.dark_mode {
            q = q.bind(dark_mode);
        }
        if let Some(card_view) = req.card_view {
            q = q.bind(card_view);
        }
        if let Some(default_color) = &req.default_color {
            q = q.bind(default_color);
        }

        q.execute(&self.pool).await?;

        self.notifier.notify(DataEvent::Settings);
        self.get_settings().await
    }

    // ===== Backups =====

    /// Flush the WAL into the main database file so a file-level copy
    /// sees every committed write.
    pub async fn checkpoint(&self) -> Result<()> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a backup
    pub async fn record_backup(&self, path: &str, size: i64, manifest_hash: &str) -> Result<Backup> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let backup = sqlx::query_as::<_, Backup>(
            r#"
            INSERT INTO backups (id, timestamp, path, size, manifest_hash)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(now)
        .bind(path)
        .bind(size)
        .bind(manifest_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Recorded backup: {}", id);
        Ok(backup)
    }

    /// List backups, newest first
    pub async fn list_backups(&self) -> Result<Vec<Backup>> {
        let backups =
            sqlx::query_as::<_, Backup>("SELECT * FROM backups ORDER BY timestamp DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(backups)
    }

    /// Forget a backup record (the archive itself is removed by the caller)
    pub async fn delete_backup_record(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM backups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
