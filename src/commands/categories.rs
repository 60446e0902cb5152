//! Category commands

use super::short_id;
use crate::app::AppState;
use crate::cli::CategoryCommands;
use crate::error::Result;

pub async fn run(state: &AppState, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::Add { name, icon, color } => {
            let category = state
                .categories
                .create_category(&name, icon.as_deref(), color.as_deref())
                .await?;
            println!("Created category {} '{}'", category.id, category.name);
        }

        CategoryCommands::List => {
            for category in state.categories.list_categories().await? {
                let icon = category.icon.as_deref().unwrap_or("-");
                println!("{}  {}  {}", short_id(&category.id), icon, category.name);
            }
        }

        CategoryCommands::Edit {
            id,
            name,
            icon,
            color,
        } => {
            let category = state
                .categories
                .update_category(&id, name.as_deref(), icon.as_deref(), color.as_deref())
                .await?;
            println!("Updated category '{}'", category.name);
        }

        CategoryCommands::Entries { id } => {
            for diary in state.categories.diaries_in_category(&id).await? {
                println!(
                    "{}  {}  {}",
                    short_id(&diary.id),
                    diary.updated_at.format("%Y-%m-%d"),
                    diary.title
                );
            }
        }

        CategoryCommands::Delete { id } => {
            state.categories.delete_category(&id).await?;
            println!("Deleted category {}", short_id(&id));
        }
    }

    Ok(())
}
