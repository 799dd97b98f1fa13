//! Persisted application settings.
//!
//! Settings live as pretty JSON in the platform configuration directory.
//! A missing or unreadable file yields the defaults.

use anyhow::Result;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the default holding folder for moved duplicates.
pub const DEFAULT_MOVE_FOLDER_NAME: &str = "DuplicatedFiles";

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    /// Folder receiving files removed with the move policy.
    /// `None` means the default under the user's documents.
    #[serde(default)]
    pub move_target_folder: Option<PathBuf>,
    /// Raise the default log level to debug.
    #[serde(default)]
    pub enable_debug_logging: bool,
}

impl Settings {
    /// Load the settings from the default platform-specific path.
    pub fn load() -> Self {
        match Self::config_path().and_then(|p| Self::load_from(&p)) {
            Ok(settings) => settings,
            Err(e) => {
                log::debug!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from `path`, returning the defaults if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the settings to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or the file written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or the file written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Folder used by the move policy.
    ///
    /// # Errors
    ///
    /// Returns an error if no folder is configured and the user's home
    /// directory can't be determined.
    pub fn move_target_folder(&self) -> Result<PathBuf> {
        match self.move_target_folder {
            Some(ref folder) => Ok(folder.clone()),
            None => default_move_folder(),
        }
    }

    /// Get the default platform-specific settings path.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupsafe", "dupsafe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("settings.json"))
    }
}

/// `<documents>/DuplicatedFiles`, falling back to the home directory when
/// the platform reports no documents folder.
///
/// # Errors
///
/// Returns an error if the home directory can't be determined.
pub fn default_move_folder() -> Result<PathBuf> {
    let dirs =
        UserDirs::new().ok_or_else(|| anyhow::anyhow!("Failed to determine user directories"))?;
    let base = dirs
        .document_dir()
        .map_or_else(|| dirs.home_dir().to_path_buf(), Path::to_path_buf);
    Ok(base.join(DEFAULT_MOVE_FOLDER_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.move_target_folder.is_none());
        assert!(!settings.enable_debug_logging);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            move_target_folder: Some(PathBuf::from("/tmp/dups")),
            enable_debug_logging: true,
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("MoveTargetFolder"));
        assert!(raw.contains("EnableDebugLogging"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Settings::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"EnableDebugLogging": true}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert!(loaded.enable_debug_logging);
        assert!(loaded.move_target_folder.is_none());
    }

    #[test]
    fn test_load_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_move_target_folder_prefers_configured() {
        let settings = Settings {
            move_target_folder: Some(PathBuf::from("/custom")),
            ..Settings::default()
        };
        assert_eq!(settings.move_target_folder().unwrap(), PathBuf::from("/custom"));
    }

    #[test]
    fn test_default_move_folder_name() {
        if let Ok(folder) = default_move_folder() {
            assert!(folder.ends_with(DEFAULT_MOVE_FOLDER_NAME));
        }
    }
}
