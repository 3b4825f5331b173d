//! Profile subcommand handlers.

use std::path::Path;

use tracing::info;

use autonom_config::Config;
use autonom_protocols::profile::UserProfile;

use crate::cli::ProfileAction;
use crate::server::open_stores;

pub(crate) async fn handle_profile_command(
    action: ProfileAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Import { file } => profile_import(&file, config).await,
        ProfileAction::List { format } => profile_list(&format, config).await,
    }
}

async fn profile_import(file: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file).await?;
    let profiles: Vec<UserProfile> = serde_json::from_str(&content)?;
    let (_, store) = open_stores(&config.storage).await?;

    for profile in &profiles {
        store.upsert(profile).await?;
        info!(user_id = %profile.id, "Imported profile");
    }
    println!("Imported {} profile(s) from {}", profiles.len(), file.display());
    Ok(())
}

async fn profile_list(format: &str, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_stores(&config.storage).await?;
    let profiles = store.list_all().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles stored.");
        return Ok(());
    }
    println!("{:<24} {:<20} {:<30} ALLERGIES", "ID", "NAME", "PREFERENCES");
    for p in &profiles {
        println!(
            "{:<24} {:<20} {:<30} {}",
            p.id,
            p.name,
            p.preferences.join(", "),
            p.allergies.join(", ")
        );
    }
    Ok(())
}
