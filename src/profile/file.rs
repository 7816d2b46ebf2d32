//! File-backed profile store

use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{Profile, ProfileError, ProfileStore};

/// Profile persisted as a single pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ProfileError {
        ProfileError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Temp file for a replace, carrying the current document's permissions
    fn temp_file(&self, dir: &Path) -> Result<NamedTempFile, ProfileError> {
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Subject to umask, like a plain create
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let tmp = builder.tempfile_in(dir).map_err(|e| self.io_error(e))?;

        match fs::metadata(&self.path) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| self.io_error(e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }
        Ok(tmp)
    }

    fn encode(profile: &Profile) -> Result<Vec<u8>, ProfileError> {
        // 4-space indent keeps the file readable when edited by hand
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        profile.serialize(&mut ser)?;
        Ok(buf)
    }
}

impl ProfileStore for FileProfileStore {
    fn read(&self) -> Result<Profile, ProfileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No profile document at {}, starting empty", self.path.display());
                return Ok(Profile::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|source| ProfileError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn replace(&self, profile: &Profile) -> Result<(), ProfileError> {
        let bytes = Self::encode(profile)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        // Write beside the target and rename over it so readers never see a partial document
        let mut tmp = self.temp_file(&dir)?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        log::debug!("Wrote profile document {} ({} keys)", self.path.display(), profile.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileProfileStore {
        FileProfileStore::new(dir.path().join("user_profile.json"))
    }

    #[test]
    fn test_read_missing_document_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let profile = store.read().unwrap();

        assert!(profile.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("name", "Alice").unwrap();

        let profile = store.read().unwrap();
        assert_eq!(profile.get("name").map(String::as_str), Some("Alice"));
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("name", "Alice").unwrap();
        store.write("city", "Paris").unwrap();
        store.write("name", "Bob").unwrap();

        let profile = store.read().unwrap();
        assert_eq!(profile.get("name").map(String::as_str), Some("Bob"));
        assert_eq!(profile.get("city").map(String::as_str), Some("Paris"));
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn test_key_independence() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("name", "Alice").unwrap();
        store.write("city", "Paris").unwrap();

        let profile = store.read().unwrap();
        let expected: Profile = [("name", "Alice"), ("city", "Paris")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(profile, expected);
    }

    #[test]
    fn test_document_is_pretty_json_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("name", "Alice").unwrap();
        store.write("city", "Paris").unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{\n    \"name\": \"Alice\",\n    \"city\": \"Paris\"\n}");
    }

    #[test]
    fn test_empty_key_is_stored() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let status = store.write("", "anonymous").unwrap();

        assert_eq!(status.key, "");
        assert_eq!(store.read().unwrap().get("").map(String::as_str), Some("anonymous"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::new(dir.path().join("nested").join("deeper").join("profile.json"));

        store.write("name", "Alice").unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("name", "Alice").unwrap();
        store.write("name", "Bob").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "user_profile.json");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{}").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o640)).unwrap();

        store.write("name", "Alice").unwrap();
        store.write("city", "Paris").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(store.read().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_document_fails_read() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.read().unwrap_err();

        assert!(matches!(err, ProfileError::Corrupt { .. }));
    }

    #[test]
    fn test_corrupt_document_fails_write_and_is_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "[1, 2, 3]").unwrap();

        let err = store.write("name", "Alice").unwrap_err();

        assert!(matches!(err, ProfileError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "").unwrap();

        assert!(matches!(store.read(), Err(ProfileError::Corrupt { .. })));
    }

    #[test]
    fn test_non_string_values_are_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"age": 30}"#).unwrap();

        assert!(matches!(store.read(), Err(ProfileError::Corrupt { .. })));
    }

    #[test]
    fn test_reads_hand_written_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"name": "Alice", "language": "French"}"#).unwrap();

        let profile = store.read().unwrap();

        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get("language").map(String::as_str), Some("French"));
    }
}
