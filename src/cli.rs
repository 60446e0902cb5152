//! Command-line interface definition
//!
//! Argument parsing only; execution lives in the commands module.

use crate::database::{Mood, Weather};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(about = "Local-first diary and journal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Diary entry operations
    #[command(subcommand)]
    Diary(DiaryCommands),

    /// Todo list operations
    #[command(subcommand)]
    Todo(TodoCommands),

    /// Tag operations
    #[command(subcommand)]
    Tag(TagCommands),

    /// Category operations
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Read or change application settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Export entries as markdown files
    Export {
        /// Target directory for the exported files
        dir: PathBuf,
    },

    /// Import markdown files or a directory of them
    Import {
        /// A .md file or a directory containing .md files
        path: PathBuf,
    },

    /// Backup and restore
    #[command(subcommand)]
    Backup(BackupCommands),
}

#[derive(Subcommand, Debug)]
pub enum DiaryCommands {
    /// Create a new entry
    #[command(alias = "add")]
    New {
        title: String,

        /// Entry body; reads nothing when omitted
        #[arg(long, default_value = "")]
        content: String,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        mood: Option<Mood>,

        #[arg(long)]
        weather: Option<Weather>,

        #[arg(long)]
        location: Option<String>,

        /// Tag names to attach, may repeat
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Show one entry in full
    Show { id: String },

    /// List entries, newest first
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, value_enum, default_value_t = SortArg::Updated)]
        sort: SortArg,

        #[arg(long, value_enum, default_value_t = DirectionArg::Desc)]
        direction: DirectionArg,
    },

    /// Search entries by relevance
    Search {
        query: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Edit fields of an entry
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Remove the entry from its category
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,

        #[arg(long)]
        mood: Option<Mood>,

        #[arg(long)]
        weather: Option<Weather>,

        #[arg(long)]
        location: Option<String>,
    },

    /// Mark an entry as favorite
    #[command(alias = "fav")]
    Favorite {
        id: String,

        /// Remove the favorite mark instead
        #[arg(long)]
        unset: bool,
    },

    /// Pin an entry to the top of listings
    Pin {
        id: String,

        #[arg(long)]
        unset: bool,
    },

    /// Attach a tag by name, creating it if needed
    Tag { id: String, name: String },

    /// Detach a tag by name
    Untag { id: String, name: String },

    /// Delete an entry permanently
    #[command(alias = "rm")]
    Delete { id: String },
}

/// Filter flags shared by list and search
#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Only entries carrying this tag name, may repeat
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Only entries in this category id
    #[arg(long)]
    pub category: Option<String>,

    /// Only favorite entries
    #[arg(long)]
    pub favorites: bool,

    /// Only entries with this mood
    #[arg(long)]
    pub mood: Option<Mood>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Created,
    Updated,
    Title,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DirectionArg {
    Asc,
    Desc,
}

#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Create a todo
    #[command(alias = "new")]
    Add {
        title: String,

        #[arg(long)]
        content: Option<String>,

        /// Due date, "YYYY-MM-DD" or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },

    /// List todos (all by default)
    #[command(alias = "ls")]
    List {
        #[arg(long, conflicts_with_all = ["completed", "overdue"])]
        open: bool,

        #[arg(long, conflicts_with = "overdue")]
        completed: bool,

        #[arg(long)]
        overdue: bool,
    },

    /// Show one todo
    Show { id: String },

    /// Edit a todo
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        due: Option<String>,

        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Mark a todo as done
    Done { id: String },

    /// Reopen a completed todo
    Reopen { id: String },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Create a tag
    #[command(alias = "new")]
    Add {
        name: String,

        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,
    },

    /// List all tags
    #[command(alias = "ls")]
    List,

    /// Rename a tag
    Rename { id: String, name: String },

    /// Change a tag's color
    Color { id: String, color: String },

    /// List entries carrying a tag
    Entries { id: String },

    /// Delete a tag everywhere
    #[command(alias = "rm")]
    Delete { id: String },

    /// Delete tags no entry uses
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    #[command(alias = "new")]
    Add {
        name: String,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// List all categories
    #[command(alias = "ls")]
    List,

    /// Edit a category
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// List entries in a category
    Entries { id: String },

    /// Delete a category; its entries stay, uncategorized
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print current settings
    Show,

    /// Change settings
    Set {
        /// "list" or "grid"
        #[arg(long)]
        view_mode: Option<String>,

        #[arg(long)]
        dark_mode: Option<bool>,

        #[arg(long)]
        card_view: Option<bool>,

        /// Default entry color as #rrggbb
        #[arg(long)]
        default_color: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Create a backup archive
    Create,

    /// List recorded backups, newest first
    #[command(alias = "ls")]
    List,

    /// Restore a backup archive into the data directory
    Restore {
        /// Path to a backup .zip
        path: PathBuf,
    },
}
