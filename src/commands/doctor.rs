//! Diagnose profilebot setup issues

use colored::*;
use eyre::Result;

use crate::config::Config;
use crate::profile::{FileProfileStore, ProfileStore};

pub fn run(config: &Config) -> Result<()> {
    println!("{}", "profilebot Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Check config file
    let config_file = Config::profilebot_dir().join("profilebot.yaml");
    if config_file.exists() {
        println!("{} Config file: {}", "✓".green(), config_file.display());
    } else {
        println!("{} Config file not found, using defaults: {}", "⚠".yellow(), config_file.display());
    }

    // Check API key
    if config.api_key().is_some() {
        println!("{} API key: {} is set", "✓".green(), config.agent.api_key_env);
    } else {
        println!("{} API key missing: {}", "✗".red(), config.agent.api_key_env);
        println!("  Export it or add it to {}", ".env".cyan());
        issues += 1;
    }

    // Check profile document
    let store = FileProfileStore::new(config.profile_path());
    if !store.path().exists() {
        println!(
            "{} Profile document: {} (created on first update)",
            "⚠".yellow(),
            store.path().display()
        );
    } else {
        match store.read() {
            Ok(profile) => println!(
                "{} Profile document: {} ({} keys)",
                "✓".green(),
                store.path().display(),
                profile.len()
            ),
            Err(e) => {
                println!("{} Profile document unreadable: {}", "✗".red(), e);
                issues += 1;
            }
        }
    }

    println!();

    // Summary
    println!("{}", "═".repeat(50));
    if issues == 0 {
        println!("{} All checks passed!", "✓".green().bold());
    } else {
        println!("{} {} issue(s) found", "⚠".yellow().bold(), issues);
    }

    Ok(())
}
