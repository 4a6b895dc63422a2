//! Blob persistence for store state.
//!
//! Covers:
//! - named-blob path resolution under the XDG config directory
//! - atomic blob writes (temp file + rename)
//! - `ConfigStore` save/load against the fixed store name
//!
//! A missing blob falls back to baseline defaults without error; a corrupt
//! blob logs a warning and falls back the same way. The blob payload is the
//! dotfile text form, so a saved store is also a valid `.clang-format`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::store::ConfigStore;

/// Fixed blob name the option mapping persists under.
pub const CONFIG_STORE_NAME: &str = "clang-format-config";

/// Resolve the on-disk path for a named blob (XDG convention).
pub fn blob_path(store_name: &str) -> PathBuf {
    let file_name = format!("{store_name}.yaml");
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("par-fmt").join(file_name)
        } else {
            PathBuf::from(file_name)
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        // Use XDG convention on all platforms: ~/.config/par-fmt/<name>.yaml
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("par-fmt").join(file_name)
        } else {
            // Fallback if home directory cannot be determined
            PathBuf::from(file_name)
        }
    }
}

/// Write a blob atomically: temp file then rename, creating parent
/// directories as needed.
pub fn write_blob(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Atomic save: write to temp file then rename to prevent corruption on crash
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read a blob, or `None` when it is absent or unreadable.
pub fn read_blob(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            log::warn!("Failed to read blob {path:?}: {e}");
            None
        }
    }
}

impl ConfigStore {
    /// Load the store from the default blob location, falling back to
    /// baseline defaults when no blob exists.
    pub fn load() -> Self {
        Self::load_from(&blob_path(CONFIG_STORE_NAME))
    }

    /// Load the store from a specific blob path.
    ///
    /// Absent blob or corrupt contents both produce a baseline store; a
    /// corrupt blob adds a warning.
    pub fn load_from(path: &Path) -> Self {
        let store = Self::new();
        if let Some(text) = read_blob(path) {
            if store.load_from_text(&text) {
                log::info!("Loaded option state from {path:?}");
            } else {
                log::warn!("Ignoring corrupt option blob {path:?}; using defaults");
            }
        }
        store
    }

    /// Save the current mapping to the default blob location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&blob_path(CONFIG_STORE_NAME))
    }

    /// Save the current mapping to a specific blob path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_blob(path, &format!("{}\n", self.to_text()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("clang-format-config.yaml");

        let store = ConfigStore::new();
        store.set("IndentWidth", OptionValue::Int(4)).unwrap();
        store.set("UseTab", OptionValue::Bool(true)).unwrap();
        store.save_to(&path).expect("save should succeed");

        let restored = ConfigStore::load_from(&path);
        assert_eq!(restored.get("IndentWidth"), Some(OptionValue::Int(4)));
        assert_eq!(restored.get("UseTab"), Some(OptionValue::Bool(true)));
        assert_eq!(restored.get("ColumnLimit"), Some(OptionValue::Int(80)));
    }

    #[test]
    fn test_load_missing_blob_yields_baseline() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("does-not-exist.yaml");

        let store = ConfigStore::load_from(&path);
        assert!(store.diff().is_empty());
    }

    #[test]
    fn test_load_corrupt_blob_yields_baseline() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("clang-format-config.yaml");
        std::fs::write(&path, "IndentWidth: [unclosed\n").unwrap();

        let store = ConfigStore::load_from(&path);
        assert!(store.diff().is_empty());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("dir").join("blob.yaml");

        let store = ConfigStore::new();
        store.save_to(&path).expect("save should succeed");
        assert!(path.exists());
    }

    #[test]
    fn test_saved_blob_is_dotfile_text() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("blob.yaml");

        let store = ConfigStore::new();
        store.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("BasedOnStyle: LLVM\n"));
        assert!(contents.ends_with('\n'));
    }
}
