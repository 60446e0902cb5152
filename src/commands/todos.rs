//! Todo commands

use super::short_id;
use crate::app::AppState;
use crate::cli::TodoCommands;
use crate::database::{CreateTodoRequest, Todo, UpdateTodoRequest};
use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub async fn run(state: &AppState, command: TodoCommands) -> Result<()> {
    match command {
        TodoCommands::Add {
            title,
            content,
            due,
        } => {
            let due_date = due.as_deref().map(parse_due_date).transpose()?;

            let todo = state
                .todos
                .create_todo(CreateTodoRequest {
                    title,
                    content,
                    due_date,
                })
                .await?;

            println!("Created todo {}", todo.id);
        }

        TodoCommands::List {
            open,
            completed,
            overdue,
        } => {
            let todos = if overdue {
                state.todos.list_overdue().await?
            } else if open {
                state.todos.list_open().await?
            } else if completed {
                state.todos.list_completed().await?
            } else {
                state.todos.list_todos().await?
            };

            for todo in &todos {
                print_todo_line(todo);
            }
        }

        TodoCommands::Show { id } => {
            let todo = state.todos.get_todo(&id).await?;

            println!("{}", todo.title);
            println!("id:      {}", todo.id);
            println!("status:  {}", if todo.completed { "done" } else { "open" });
            if let Some(due) = todo.due_date {
                println!("due:     {}", due.format("%Y-%m-%d %H:%M"));
            }
            if let Some(content) = &todo.content {
                println!();
                println!("{}", content);
            }
        }

        TodoCommands::Edit {
            id,
            title,
            content,
            due,
            clear_due,
        } => {
            let due_date = due.as_deref().map(parse_due_date).transpose()?;

            let todo = state
                .todos
                .update_todo(UpdateTodoRequest {
                    id,
                    title,
                    content,
                    due_date,
                    clear_due_date: clear_due,
                })
                .await?;

            println!("Updated todo {}", todo.id);
        }

        TodoCommands::Done { id } => {
            state.todos.set_completed(&id, true).await?;
            println!("Completed todo {}", short_id(&id));
        }

        TodoCommands::Reopen { id } => {
            state.todos.set_completed(&id, false).await?;
            println!("Reopened todo {}", short_id(&id));
        }

        TodoCommands::Delete { id } => {
            state.todos.delete_todo(&id).await?;
            println!("Deleted todo {}", short_id(&id));
        }
    }

    Ok(())
}

fn print_todo_line(todo: &Todo) {
    let checkbox = if todo.completed { "[x]" } else { "[ ]" };
    let due = todo
        .due_date
        .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();

    println!("{} {}  {}{}", checkbox, short_id(&todo.id), todo.title, due);
}

/// Accept a bare date (due at end of that day, UTC) or a full RFC 3339
/// timestamp.
fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        return Ok(date.and_time(end_of_day).and_utc());
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::Validation(format!(
                "Cannot parse due date '{}', expected YYYY-MM-DD or RFC 3339",
                input
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_bare_date() {
        let due = parse_due_date("2024-03-05").unwrap();

        assert_eq!((due.year(), due.month(), due.day()), (2024, 3, 5));
        assert_eq!(due.hour(), 23);
    }

    #[test]
    fn test_parse_rfc3339() {
        let due = parse_due_date("2024-03-05T10:30:00Z").unwrap();

        assert_eq!(due.hour(), 10);
        assert_eq!(due.minute(), 30);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_due_date("next tuesday").is_err());
    }
}
