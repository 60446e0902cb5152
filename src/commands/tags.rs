//! Tag commands

use super::short_id;
use crate::app::AppState;
use crate::cli::TagCommands;
use crate::config;
use crate::error::Result;

pub async fn run(state: &AppState, command: TagCommands) -> Result<()> {
    match command {
        TagCommands::Add { name, color } => {
            let color = color.as_deref().unwrap_or(config::DEFAULT_TAG_COLOR);
            let tag = state.tags.create_tag(&name, color).await?;
            println!("Created tag {} '{}'", tag.id, tag.name);
        }

        TagCommands::List => {
            for tag in state.tags.list_tags().await? {
                println!("{}  {}  {}", short_id(&tag.id), tag.color, tag.name);
            }
        }

        TagCommands::Rename { id, name } => {
            let tag = state.tags.rename_tag(&id, &name).await?;
            println!("Renamed tag {} to '{}'", short_id(&tag.id), tag.name);
        }

        TagCommands::Color { id, color } => {
            let tag = state.tags.set_color(&id, &color).await?;
            println!("Tag '{}' is now {}", tag.name, tag.color);
        }

        TagCommands::Entries { id } => {
            for diary in state.tags.diaries_for_tag(&id).await? {
                println!(
                    "{}  {}  {}",
                    short_id(&diary.id),
                    diary.updated_at.format("%Y-%m-%d"),
                    diary.title
                );
            }
        }

        TagCommands::Delete { id } => {
            state.tags.delete_tag(&id).await?;
            println!("Deleted tag {}", short_id(&id));
        }

        TagCommands::Prune => {
            let pruned = state.tags.prune_unused().await?;
            println!("Pruned {} unused tags", pruned);
        }
    }

    Ok(())
}
