//! Diary entry commands

use super::short_id;
use crate::app::AppState;
use crate::cli::{DiaryCommands, DirectionArg, FilterArgs, SortArg};
use crate::database::{CreateDiaryRequest, DiaryWithTags, UpdateDiaryRequest};
use crate::error::{AppError, Result};
use crate::services::{DiaryFilter, SortDirection, SortKey};

pub async fn run(state: &AppState, command: DiaryCommands) -> Result<()> {
    match command {
        DiaryCommands::New {
            title,
            content,
            category,
            mood,
            weather,
            location,
            tags,
        } => {
            let entry = state
                .diaries
                .create_diary(CreateDiaryRequest {
                    title,
                    content,
                    category_id: category,
                    mood,
                    weather,
                    location,
                    images: Vec::new(),
                })
                .await?;

            for name in tags {
                state.diaries.tag_diary(&entry.diary.id, &name).await?;
            }

            println!("Created entry {}", entry.diary.id);
        }

        DiaryCommands::Show { id } => {
            let entry = state.diaries.get_diary(&id).await?;
            print_entry(state, &entry).await?;
        }

        DiaryCommands::List {
            filter,
            sort,
            direction,
        } => {
            let mut filter = resolve_filter(state, filter).await?;
            filter.sort = match sort {
                SortArg::Created => SortKey::Created,
                SortArg::Updated => SortKey::Updated,
                SortArg::Title => SortKey::Title,
            };
            filter.direction = match direction {
                DirectionArg::Asc => SortDirection::Asc,
                DirectionArg::Desc => SortDirection::Desc,
            };

            let entries = state.diaries.filtered(&filter).await?;
            print_entry_lines(&entries);
        }

        DiaryCommands::Search { query, filter } => {
            let mut filter = resolve_filter(state, filter).await?;
            filter.query = Some(query);

            let entries = state.diaries.filtered(&filter).await?;
            if entries.is_empty() {
                println!("No matching entries");
            } else {
                print_entry_lines(&entries);
            }
        }

        DiaryCommands::Edit {
            id,
            title,
            content,
            category,
            clear_category,
            mood,
            weather,
            location,
        } => {
            let entry = state
                .diaries
                .update_diary(UpdateDiaryRequest {
                    id,
                    title,
                    content,
                    category_id: category,
                    clear_category,
                    mood,
                    weather,
                    location,
                    images: None,
                })
                .await?;

            println!("Updated entry {}", entry.diary.id);
        }

        DiaryCommands::Favorite { id, unset } => {
            state.diaries.set_favorite(&id, !unset).await?;
            println!(
                "Entry {} {}",
                short_id(&id),
                if unset { "unfavorited" } else { "favorited" }
            );
        }

        DiaryCommands::Pin { id, unset } => {
            state.diaries.set_pinned(&id, !unset).await?;
            println!(
                "Entry {} {}",
                short_id(&id),
                if unset { "unpinned" } else { "pinned" }
            );
        }

        DiaryCommands::Tag { id, name } => {
            let tag = state.diaries.tag_diary(&id, &name).await?;
            println!("Tagged entry {} with '{}'", short_id(&id), tag.name);
        }

        DiaryCommands::Untag { id, name } => {
            state.diaries.untag_diary(&id, &name).await?;
            println!("Removed '{}' from entry {}", name, short_id(&id));
        }

        DiaryCommands::Delete { id } => {
            state.diaries.delete_diary(&id).await?;
            println!("Deleted entry {}", short_id(&id));
        }
    }

    Ok(())
}

/// Turn CLI filter flags into the in-memory filter, resolving tag
/// names to ids. Unknown tag names are an error, not an empty result.
async fn resolve_filter(state: &AppState, args: FilterArgs) -> Result<DiaryFilter> {
    let mut tag_ids = Vec::with_capacity(args.tags.len());
    for name in &args.tags {
        let tag = state
            .repo
            .get_tag_by_name(name)
            .await?
            .ok_or_else(|| AppError::TagNotFound(name.clone()))?;
        tag_ids.push(tag.id);
    }

    Ok(DiaryFilter {
        tag_ids,
        category_id: args.category,
        favorite_only: args.favorites,
        mood: args.mood,
        ..Default::default()
    })
}

fn print_entry_lines(entries: &[DiaryWithTags]) {
    for entry in entries {
        let mut markers = String::new();
        if entry.diary.pinned {
            markers.push('^');
        }
        if entry.diary.favorite {
            markers.push('*');
        }

        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
            format!("  [{}]", names.join(", "))
        };

        println!(
            "{}  {}  {}{}{}",
            short_id(&entry.diary.id),
            entry.diary.updated_at.format("%Y-%m-%d"),
            markers,
            entry.diary.title,
            tags
        );
    }
}

async fn print_entry(state: &AppState, entry: &DiaryWithTags) -> Result<()> {
    println!("{}", entry.diary.title);
    println!("id:      {}", entry.diary.id);
    println!("created: {}", entry.diary.created_at.format("%Y-%m-%d %H:%M"));
    println!("updated: {}", entry.diary.updated_at.format("%Y-%m-%d %H:%M"));

    if let Some(category_id) = &entry.diary.category_id {
        let category = state.categories.get_category(category_id).await?;
        println!("category: {}", category.name);
    }
    if let Some(mood) = entry.diary.mood {
        println!("mood:    {}", mood);
    }
    if let Some(weather) = entry.diary.weather {
        println!("weather: {}", weather);
    }
    if let Some(location) = &entry.diary.location {
        println!("location: {}", location);
    }
    if !entry.tags.is_empty() {
        let names: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags:    {}", names.join(", "));
    }
    if entry.diary.favorite {
        println!("favorite: yes");
    }
    if entry.diary.pinned {
        println!("pinned:  yes");
    }

    if !entry.diary.content.is_empty() {
        println!();
        println!("{}", entry.diary.content);
    }

    Ok(())
}
