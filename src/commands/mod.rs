pub mod ask;
pub mod chat;
pub mod completions;
pub mod config;
pub mod doctor;
pub mod profile;

use colored::*;
use eyre::{Context, Result};
use std::sync::Arc;

use crate::agent::GeminiAgent;
use crate::config::Config;
use crate::conversation::Session;
use crate::profile::{FileProfileStore, MemoryProfileStore, ProfileStore};
use crate::tools::{ProfileTools, ToolCallRecord};

/// Start a session bound to the configured agent, returning it with its greeting.
/// With `dry_run` the agent works on an in-memory copy of the profile.
fn open_session(config: &Config, dry_run: bool) -> Result<(Session, String)> {
    let file = FileProfileStore::new(config.profile_path());
    let store: Arc<dyn ProfileStore> = if dry_run {
        let profile = file.read().context("Failed to read profile")?;
        log::info!("Dry run: profile changes stay in memory");
        Arc::new(MemoryProfileStore::with_profile(profile))
    } else {
        Arc::new(file)
    };
    let agent = GeminiAgent::new(&config.agent, config.api_key(), ProfileTools::new(store));

    let mut session = Session::new(config.conversation.clone());
    let greeting = session.start(Box::new(agent)).to_string();
    Ok((session, greeting))
}

fn print_tool_calls(calls: &[ToolCallRecord]) {
    for call in calls {
        println!("  {} {} {}", "⚙".dimmed(), call.tool_name.bold(), call.tool_input.to_string().dimmed());
        println!("    {} {}", "→".dimmed(), call.tool_output.to_string().dimmed());
    }
}
