//! Settings commands

use crate::app::AppState;
use crate::cli::SettingsCommands;
use crate::database::UpdateSettingsRequest;
use crate::error::Result;

pub async fn run(state: &AppState, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Show => {
            let settings = state.settings.get_settings().await?;

            println!("view_mode:     {}", settings.view_mode);
            println!("dark_mode:     {}", settings.dark_mode);
            println!("card_view:     {}", settings.card_view);
            println!("default_color: {}", settings.default_color);
        }

        SettingsCommands::Set {
            view_mode,
            dark_mode,
            card_view,
            default_color,
        } => {
            state
                .settings
                .update_settings(UpdateSettingsRequest {
                    view_mode,
                    dark_mode,
                    card_view,
                    default_color,
                })
                .await?;

            println!("Settings updated");
        }
    }

    Ok(())
}
