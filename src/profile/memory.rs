//! In-memory profile store

use std::sync::{Mutex, MutexGuard};

use super::{Profile, ProfileError, ProfileStore};

/// Profile kept in process memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profile: Mutex<Profile>,
}

impl MemoryProfileStore {
    /// Start from an existing document
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile: Mutex::new(profile),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Profile> {
        // Replacement is a single assignment, so a poisoned map is still whole
        self.profile.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProfileStore for MemoryProfileStore {
    fn read(&self) -> Result<Profile, ProfileError> {
        Ok(self.lock().clone())
    }

    fn replace(&self, profile: &Profile) -> Result<(), ProfileError> {
        *self.lock() = profile.clone();
        Ok(())
    }
}
