//! Direct access to the stored user profile

use colored::*;
use eyre::{Context, Result};
use std::sync::Arc;

use crate::cli::{OutputFormat, ProfileAction};
use crate::config::Config;
use crate::profile::{FileProfileStore, ProfileStore};
use crate::tools::ProfileTools;

pub fn run(action: ProfileAction, config: &Config) -> Result<()> {
    let store = Arc::new(FileProfileStore::new(config.profile_path()));

    match action {
        ProfileAction::Show { format } => show(OutputFormat::resolve(format), store.as_ref()),
        ProfileAction::Get { key } => get(&key, store.as_ref()),
        ProfileAction::Set { key, value } => set(&key, &value, ProfileTools::new(store)),
        ProfileAction::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
    }
}

fn show(format: OutputFormat, store: &FileProfileStore) -> Result<()> {
    let profile = store.read().context("Failed to read profile")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&profile)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "User Profile".bold(), store.path().display().to_string().dimmed());
            println!();

            if profile.is_empty() {
                println!("  {}", "Nothing known yet".dimmed());
            }
            for (key, value) in &profile {
                println!("  {}: {}", key.cyan(), value);
            }
        }
    }

    Ok(())
}

fn get(key: &str, store: &FileProfileStore) -> Result<()> {
    let profile = store.read().context("Failed to read profile")?;

    match profile.get(key) {
        Some(value) => println!("{}", value),
        None => eyre::bail!("No profile value for key: {}", key),
    }

    Ok(())
}

fn set(key: &str, value: &str, tools: ProfileTools) -> Result<()> {
    let status = tools
        .update_user_profile(key, value)
        .context("Failed to update profile")?;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
