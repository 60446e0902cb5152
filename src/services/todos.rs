//! Todos service
//!
//! Business logic for the todo list that lives alongside the diary.
//! The interesting views (open, completed, overdue) are computed here
//! from the single repository listing.

use crate::config;
use crate::database::{CreateTodoRequest, Repository, Todo, UpdateTodoRequest};
use crate::error::{AppError, Result};
use chrono::Utc;

/// Service for managing todos
#[derive(Clone)]
pub struct TodosService {
    repo: Repository,
}

impl TodosService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new todo
    pub async fn create_todo(&self, req: CreateTodoRequest) -> Result<Todo> {
        validate_title(&req.title)?;

        tracing::info!("Creating new todo: {}", req.title);

        self.repo.create_todo(req).await
    }

    /// Get a todo by ID
    pub async fn get_todo(&self, id: &str) -> Result<Todo> {
        self.repo.get_todo(id).await
    }

    /// List all todos, open ones first
    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        self.repo.list_todos().await
    }

    /// List todos that are not yet completed
    pub async fn list_open(&self) -> Result<Vec<Todo>> {
        let todos = self.repo.list_todos().await?;
        Ok(todos.into_iter().filter(|t| !t.completed).collect())
    }

    /// List completed todos
    pub async fn list_completed(&self) -> Result<Vec<Todo>> {
        let todos = self.repo.list_todos().await?;
        Ok(todos.into_iter().filter(|t| t.completed).collect())
    }

    /// List open todos whose due date has passed
    pub async fn list_overdue(&self) -> Result<Vec<Todo>> {
        let now = Utc::now();
        let todos = self.repo.list_todos().await?;

        Ok(todos
            .into_iter()
            .filter(|t| !t.completed && t.due_date.is_some_and(|due| due < now))
            .collect())
    }

    /// Update a todo
    pub async fn update_todo(&self, req: UpdateTodoRequest) -> Result<Todo> {
        if let Some(title) = &req.title {
            validate_title(title)?;
        }

        tracing::debug!("Updating todo: {}", req.id);

        self.repo.update_todo(req).await
    }

    /// Mark a todo completed or reopen it
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<()> {
        self.repo.set_todo_completed(id, completed).await
    }

    /// Delete a todo
    pub async fn delete_todo(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting todo: {}", id);

        self.repo.delete_todo(id).await
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > config::MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title exceeds maximum length of {} characters",
            config::MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}
