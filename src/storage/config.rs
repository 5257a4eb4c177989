//! Configuration handling for Bookshelf
//!
//! Configuration is stored in `<library root>/config.toml` (library) and
//! `~/.config/bookshelf/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::manager::{DuplicatePolicy, DEFAULT_MANIFEST};
use super::store::DOCUMENT_EXTENSION;
use crate::domain::validate_collection_name;

/// Name of the config file, both globally and inside a library root
pub const CONFIG_FILE: &str = "config.toml";

/// Library used when none is configured
pub const DEFAULT_USER: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Import settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportConfig {
    /// What to do with imported books that already exist
    pub duplicate_policy: DuplicatePolicy,
}

/// Library-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Manifest document holding the collection names
    pub manifest: String,

    /// Collection used when a command names none
    pub default_collection: String,

    /// Import settings
    pub import: ImportConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            manifest: DEFAULT_MANIFEST.to_string(),
            default_collection: "default".to_string(),
            import: ImportConfig::default(),
        }
    }
}

impl LibraryConfig {
    /// Loads the configuration of a library root, defaults if absent
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read library config: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse library config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.trim().is_empty() || self.manifest.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "manifest must be a plain file name, got '{}'",
                self.manifest
            )));
        }
        let name = validate_collection_name(&self.default_collection)
            .map_err(|e| ConfigError::Invalid(format!("default_collection: {}", e)))?;
        if name != self.default_collection {
            return Err(ConfigError::Invalid(format!(
                "default_collection must not have surrounding spaces, got '{}'",
                self.default_collection
            )));
        }

        let document = format!("{}.{}", name, DOCUMENT_EXTENSION);
        if document.eq_ignore_ascii_case(&self.manifest) {
            return Err(ConfigError::Invalid(format!(
                "default_collection '{}' would be stored in the manifest file '{}'",
                name, self.manifest
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Directory holding the per-user libraries
    pub data_dir: Option<PathBuf>,

    /// Library used when `--user` is not given
    pub user: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl GlobalConfig {
    /// Returns the global config directory
    pub fn config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads the global configuration, defaults if absent
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Loads the global configuration from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Returns the directory holding the per-user libraries
    pub fn effective_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory. Use --root."))
    }

    /// Gets the effective user name from the argument, config, or default
    pub fn effective_user(&self, user: Option<&str>) -> String {
        user.map(str::to_string)
            .or_else(|| self.user.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string())
    }

    /// Resolves the library root of a user
    pub fn library_root(&self, user: Option<&str>) -> Result<PathBuf> {
        let user = self.effective_user(user);
        if user.is_empty() || user.contains(['/', '\\']) || user == "." || user == ".." {
            return Err(ConfigError::Invalid(format!("Invalid user name: '{}'", user)).into());
        }

        Ok(self.effective_data_dir()?.join("users").join(user))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "bookshelf", "bookshelf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_library_config() {
        let config = LibraryConfig::default();

        assert_eq!(config.manifest, "collections.yaml");
        assert_eq!(config.default_collection, "default");
        assert_eq!(config.import.duplicate_policy, DuplicatePolicy::Skip);
    }

    #[test]
    fn parse_library_config() {
        let toml = r#"
default_collection = "fiction"

[import]
duplicate_policy = "allow"
"#;

        let config: LibraryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.manifest, "collections.yaml");
        assert_eq!(config.default_collection, "fiction");
        assert_eq!(config.import.duplicate_policy, DuplicatePolicy::Allow);
    }

    #[test]
    fn library_config_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "manifest = \"index.yaml\"\n").unwrap();

        let loaded = LibraryConfig::load(dir.path()).unwrap();

        assert_eq!(loaded.manifest, "index.yaml");
        assert_eq!(loaded.default_collection, "default");
    }

    #[test]
    fn default_collection_cannot_be_the_manifest() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join(CONFIG_FILE), "default_collection = \"collections\"\n").unwrap();
        let err = LibraryConfig::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("manifest"));

        fs::write(
            dir.path().join(CONFIG_FILE),
            "manifest = \"index.yaml\"\ndefault_collection = \"Index\"\n",
        )
        .unwrap();
        assert!(LibraryConfig::load(dir.path()).is_err());

        fs::write(
            dir.path().join(CONFIG_FILE),
            "manifest = \"index.yaml\"\ndefault_collection = \"collections\"\n",
        )
        .unwrap();
        assert_eq!(
            LibraryConfig::load(dir.path()).unwrap().default_collection,
            "collections"
        );
    }

    #[test]
    fn default_collection_must_be_a_valid_name() {
        let dir = TempDir::new().unwrap();

        for value in ["../books", "", " padded "] {
            fs::write(
                dir.path().join(CONFIG_FILE),
                format!("default_collection = {:?}\n", value),
            )
            .unwrap();
            assert!(LibraryConfig::load(dir.path()).is_err(), "accepted {:?}", value);
        }
    }

    #[test]
    fn missing_library_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_collection, "default");
    }

    #[test]
    fn invalid_library_config_fails() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join(CONFIG_FILE), "manifest = [").unwrap();
        assert!(LibraryConfig::load(dir.path()).is_err());

        fs::write(dir.path().join(CONFIG_FILE), "manifest = \"../escape.yaml\"").unwrap();
        assert!(LibraryConfig::load(dir.path()).is_err());

        fs::write(
            dir.path().join(CONFIG_FILE),
            "[import]\nduplicate_policy = \"sometimes\"\n",
        )
        .unwrap();
        assert!(LibraryConfig::load(dir.path()).is_err());
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
data_dir = "/srv/books"
user = "ann"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/books")));
        assert_eq!(config.user.as_deref(), Some("ann"));
    }

    #[test]
    fn global_config_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = GlobalConfig::load_from(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config.default_format, OutputFormat::Text);
        assert!(config.user.is_none());
    }

    #[test]
    fn library_root_uses_user_directory() {
        let config = GlobalConfig {
            data_dir: Some(PathBuf::from("/srv/books")),
            user: Some("ann".to_string()),
            ..GlobalConfig::default()
        };

        assert_eq!(
            config.library_root(None).unwrap(),
            PathBuf::from("/srv/books/users/ann")
        );
        assert_eq!(
            config.library_root(Some("bob")).unwrap(),
            PathBuf::from("/srv/books/users/bob")
        );
        assert!(config.library_root(Some("../x")).is_err());
    }

    #[test]
    fn effective_user_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.effective_user(None), DEFAULT_USER);
    }
}
