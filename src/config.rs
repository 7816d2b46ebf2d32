use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main profilebot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub profile: ProfileConfig,
    pub agent: AgentConfig,
    pub conversation: ConversationConfig,
}

/// Log verbosity, overridden by RUST_LOG
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Profile document location, relative to the working directory unless absolute
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: String,
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Behavioral instructions given to the model on every turn
    pub instructions: String,
    /// Tool-calling rounds allowed before a turn is abandoned
    pub max_tool_rounds: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub greeting: String,
    /// Reply when no agent can be invoked
    pub fallback_reply: String,
    /// Reply when the agent fails mid-turn
    pub apology_reply: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("user_profile.json"),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            instructions: "Greet users by name if known. Detect when users share personal info and save it using tools."
                .to_string(),
            max_tool_rounds: 5,
            timeout_secs: 60,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello, how can I assist you today?".to_string(),
            fallback_reply: "Agent run method not available.".to_string(),
            apology_reply: "Sorry, something went wrong while talking to the assistant. Please try again.".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check PROFILEBOT_CONFIG env var
        if let Ok(env_path) = std::env::var("PROFILEBOT_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from PROFILEBOT_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try the profilebot directory ($PROFILEBOT_DIR or ~/.config/profilebot)
        let path = Self::profilebot_dir().join("profilebot.yaml");
        if path.exists() {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // Try ./profilebot.yaml (for development)
        let local_config = PathBuf::from("profilebot.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the profilebot directory (config file, .env)
    pub fn profilebot_dir() -> PathBuf {
        std::env::var("PROFILEBOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("profilebot"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Resolved location of the profile document
    pub fn profile_path(&self) -> PathBuf {
        Self::expand_path(&self.profile.path)
    }

    /// Look up the agent API key: environment first, then ./.env, then the profilebot directory's .env
    pub fn api_key(&self) -> Option<String> {
        let name = &self.agent.api_key_env;

        if let Ok(key) = std::env::var(name)
            && !key.is_empty()
        {
            return Some(key);
        }

        [PathBuf::from(".env"), Self::profilebot_dir().join(".env")]
            .iter()
            .find_map(|path| read_env_file(path, name))
    }
}

/// Find `name=value` in a dotenv-style file
fn read_env_file(path: &Path, name: &str) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return None,
    };

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=')
            && key.trim() == name
        {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if value.is_empty() {
                return None;
            }
            log::debug!("Found {} in {}", name, path.display());
            return Some(value.to_string());
        }
    }

    None
}
