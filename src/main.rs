//! Daybook - local-first diary and journal
//!
//! Entry point: logging, argument parsing and command dispatch.

use clap::Parser;
use daybook::app::{self, AppState};
use daybook::cli::{BackupCommands, Cli, Commands};
use daybook::commands;
use daybook::error::Result;
use daybook::services::BackupService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => app::default_data_dir()?,
    };

    // Restore swaps the database file and must run before any pool is
    // opened against it.
    if let Commands::Backup(BackupCommands::Restore { path }) = &cli.command {
        BackupService::restore_backup(path, &data_dir).await?;
        println!("Restored backup into {}", data_dir.display());
        return Ok(());
    }

    let state = AppState::initialize(data_dir).await?;

    match cli.command {
        Commands::Diary(command) => commands::diaries::run(&state, command).await,
        Commands::Todo(command) => commands::todos::run(&state, command).await,
        Commands::Tag(command) => commands::tags::run(&state, command).await,
        Commands::Category(command) => commands::categories::run(&state, command).await,
        Commands::Settings(command) => commands::settings::run(&state, command).await,
        Commands::Export { dir } => commands::transfer::export(&state, &dir).await,
        Commands::Import { path } => commands::transfer::import(&state, &path).await,
        Commands::Backup(BackupCommands::Create) => commands::backup::create(&state).await,
        Commands::Backup(BackupCommands::List) => commands::backup::list(&state).await,
        Commands::Backup(BackupCommands::Restore { .. }) => unreachable!("handled above"),
    }
}
