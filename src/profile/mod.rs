//! User profile storage
//!
//! The profile is a flat document of string keys to string values. Every write
//! reads the whole document, changes one key and replaces the whole document.
//!
//! Two backings:
//! - [`FileProfileStore`]: one JSON file on disk (production)
//! - [`MemoryProfileStore`]: an in-process map (tests, dry runs)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod file;
pub mod memory;

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;

/// Known facts about the user, keyed by name
pub type Profile = IndexMap<String, String>;

/// Errors from a profile store
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile document {} is corrupt", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access profile document {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode profile document")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of a profile update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOutcome {
    Success,
}

/// Confirmation returned by [`ProfileStore::write`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: UpdateOutcome,
    pub key: String,
    pub value: String,
}

impl UpdateStatus {
    pub fn success(key: &str, value: &str) -> Self {
        Self {
            status: UpdateOutcome::Success,
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Whole-document key/value persistence
pub trait ProfileStore: Send + Sync {
    /// Load the whole document. A document that was never written is empty.
    fn read(&self) -> Result<Profile, ProfileError>;

    /// Replace the whole document
    fn replace(&self, profile: &Profile) -> Result<(), ProfileError>;

    /// Set one key, keeping every other key as it was
    fn write(&self, key: &str, value: &str) -> Result<UpdateStatus, ProfileError> {
        let mut profile = self.read()?;
        profile.insert(key.to_string(), value.to_string());
        self.replace(&profile)?;

        log::info!("Updated profile key '{}' ({} keys total)", key, profile.len());
        log::debug!("Profile value for '{}': {}", key, value);
        Ok(UpdateStatus::success(key, value))
    }
}
