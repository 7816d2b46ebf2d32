use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "profilebot Configuration".bold());
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
            println!();

            println!("{}:", "profile".cyan());
            println!("  path: {}", config.profile_path().display());
            println!();

            println!("{}:", "agent".cyan());
            println!("  model: {}", config.agent.model);
            println!("  endpoint: {}", config.agent.endpoint);
            println!("  api_key_env: {}", config.agent.api_key_env);
            println!("  max_tool_rounds: {}", config.agent.max_tool_rounds);
            println!("  timeout_secs: {}", config.agent.timeout_secs);
            println!("  instructions: {}", config.agent.instructions.dimmed());
            println!();

            println!("{}:", "conversation".cyan());
            println!("  greeting: {}", config.conversation.greeting);
            println!("  fallback_reply: {}", config.conversation.fallback_reply);
            println!("  apology_reply: {}", config.conversation.apology_reply);
        }
    }

    Ok(())
}
